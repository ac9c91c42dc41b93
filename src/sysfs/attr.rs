//! Best-effort sysfs attribute reads.

use std::path::Path;

/// Read a text attribute, trimmed of surrounding whitespace.
///
/// Any failure (missing file, permissions, invalid UTF-8) yields `default`.
pub fn read_attr(path: &Path, default: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => content.trim().to_string(),
        Err(e) => {
            log::trace!("cannot read {}: {}", path.display(), e);
            default.to_string()
        }
    }
}

/// Read a text attribute, `None` if it is unreadable or empty.
pub fn read_attr_opt(path: &Path) -> Option<String> {
    let value = read_attr(path, "");
    (!value.is_empty()).then_some(value)
}

/// Read a hexadecimal attribute such as `idVendor` or `bInterfaceClass`.
pub fn read_hex_u16(path: &Path) -> Option<u16> {
    read_attr_opt(path).and_then(|s| u16::from_str_radix(s.trim_start_matches("0x"), 16).ok())
}

/// Read a one-byte hexadecimal attribute.
pub fn read_hex_u8(path: &Path) -> Option<u8> {
    read_attr_opt(path).and_then(|s| u8::from_str_radix(s.trim_start_matches("0x"), 16).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_returns_default() {
        let dir = TempDir::new().unwrap();
        assert_eq!(read_attr(&dir.path().join("nope"), "Unknown Hub"), "Unknown Hub");
        assert_eq!(read_attr_opt(&dir.path().join("nope")), None);
    }

    #[test]
    fn test_trailing_whitespace_stripped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("speed");
        fs::write(&path, "480\n").unwrap();
        assert_eq!(read_attr(&path, ""), "480");
    }

    #[test]
    fn test_invalid_utf8_returns_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("product");
        fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        assert_eq!(read_attr(&path, "default"), "default");
    }

    #[test]
    fn test_directory_returns_default() {
        let dir = TempDir::new().unwrap();
        assert_eq!(read_attr(dir.path(), "default"), "default");
    }

    #[test]
    fn test_hex_attributes() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("idVendor"), "046d\n").unwrap();
        fs::write(dir.path().join("class"), "0x0c0330\n").unwrap();
        fs::write(dir.path().join("bInterfaceClass"), "03\n").unwrap();
        fs::write(dir.path().join("empty"), "\n").unwrap();
        assert_eq!(read_hex_u16(&dir.path().join("idVendor")), Some(0x046d));
        assert_eq!(read_hex_u8(&dir.path().join("bInterfaceClass")), Some(0x03));
        assert_eq!(read_hex_u8(&dir.path().join("class")), None);
        assert_eq!(read_hex_u16(&dir.path().join("empty")), None);
    }
}
