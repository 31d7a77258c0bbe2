//! evdev character device backing the gyroscope.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::{Path, PathBuf};

use nix::errno::Errno;
use nix::sys::ioctl::ioctl_num_type;
use tracing::{debug, info};

use super::reader::{EventSource, InputEventReader};
use super::InputEvent;
use crate::error::{GyroError, GyroResult};

/// Default location of evdev nodes.
pub const DEV_INPUT_DIR: &str = "/dev/input";

/// Default location of the input class in sysfs.
pub const SYSFS_INPUT_CLASS: &str = "/sys/class/input";

/// `EVIOCGABS(abs)`: `_IOR('E', 0x40 + abs, struct input_absinfo)`.
fn eviocgabs(code: u16) -> ioctl_num_type {
    nix::request_code_read!(
        b'E',
        0x40 + code,
        std::mem::size_of::<libc::input_absinfo>()
    )
}

/// An opened `/dev/input/eventN` node.
pub struct InputDevice {
    path: PathBuf,
    node: String,
    reader: InputEventReader<File>,
}

impl InputDevice {
    /// Open an event node in non-blocking mode.
    ///
    /// `capacity` bounds how many events a single fill may buffer.
    pub fn open<P: AsRef<Path>>(path: P, capacity: usize) -> GyroResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&path)?;
        let node = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        debug!("Opened input device {}", path.display());
        Ok(Self {
            path,
            node,
            reader: InputEventReader::new(file, capacity),
        })
    }

    /// Find and open the event node whose input device reports `name`.
    pub fn find_by_name(name: &str, capacity: usize) -> GyroResult<Self> {
        let path = find_event_node(
            Path::new(DEV_INPUT_DIR),
            Path::new(SYSFS_INPUT_CLASS),
            name,
        )?;
        info!("Found input device '{}' at {}", name, path.display());
        Self::open(path, capacity)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Node name such as `event3`.
    pub fn node(&self) -> &str {
        &self.node
    }

    /// Directory holding the sensor's sysfs control files.
    pub fn default_control_path(&self) -> PathBuf {
        default_control_path(Path::new(SYSFS_INPUT_CLASS), &self.node)
    }
}

impl AsRawFd for InputDevice {
    fn as_raw_fd(&self) -> RawFd {
        self.reader.get_ref().as_raw_fd()
    }
}

impl EventSource for InputDevice {
    fn fill(&mut self) -> io::Result<usize> {
        self.reader.fill()
    }

    fn read_event(&self) -> Option<InputEvent> {
        self.reader.read_event()
    }

    fn next(&mut self) {
        self.reader.next()
    }

    fn abs_value(&mut self, code: u16) -> io::Result<i32> {
        let mut info = libc::input_absinfo {
            value: 0,
            minimum: 0,
            maximum: 0,
            fuzz: 0,
            flat: 0,
            resolution: 0,
        };
        // SAFETY: EVIOCGABS writes exactly one input_absinfo into `info`, which
        // outlives the call. The fd is owned by `self.reader`.
        let rc = unsafe {
            libc::ioctl(
                self.as_raw_fd(),
                eviocgabs(code),
                &mut info as *mut libc::input_absinfo,
            )
        };
        Errno::result(rc).map_err(io::Error::from)?;
        Ok(info.value)
    }
}

/// `<sysfs_class>/<node>/device/device/`
pub fn default_control_path(sysfs_class: &Path, node: &str) -> PathBuf {
    sysfs_class.join(node).join("device").join("device")
}

/// Scan `dev_dir` for `event*` nodes and return the one named `name` in sysfs.
pub fn find_event_node(dev_dir: &Path, sysfs_class: &Path, name: &str) -> GyroResult<PathBuf> {
    let pattern = dev_dir.join("event*");
    let pattern = pattern
        .to_str()
        .ok_or_else(|| GyroError::Config(format!("Non UTF-8 path: {}", dev_dir.display())))?;
    let entries = glob::glob(pattern).map_err(|e| GyroError::Config(e.to_string()))?;

    let mut nodes: Vec<PathBuf> = entries.filter_map(Result::ok).collect();
    nodes.sort();

    for node in nodes {
        let Some(node_name) = node.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let name_file = sysfs_class.join(node_name).join("device").join("name");
        match std::fs::read_to_string(&name_file) {
            Ok(found) if found.trim() == name => return Ok(node),
            Ok(_) => {}
            Err(e) => debug!("Skipping {}: {}", name_file.display(), e),
        }
    }

    Err(GyroError::DeviceNotFound(name.to_string()))
}
