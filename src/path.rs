//! Small filesystem helpers: existence checks, mkdir, symlinks and VCS root
//! discovery.

use std::ffi::OsStr;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use path_clean::PathClean;

use crate::Result;
use crate::error::Error;

/// Message used by [`check_file_exist`] when the caller has none. `{}` is
/// replaced with the path.
pub const FILE_NOT_EXIST_TMPL: &str = "file `{}` not exist or is a directory";

/// Markers that identify the root of a version-controlled tree.
pub const DEFAULT_VCS_MARKERS: &[&str] = &[".git"];

/// Whether `path` can name a location at all, i.e. is not empty.
pub fn is_filepath(path: impl AsRef<OsStr>) -> bool {
    !path.as_ref().is_empty()
}

/// Checks that `path` is an existing regular file.
///
/// # Errors
/// Returns [`Error::FileAccess`] with `msg_tmpl` (or [`FILE_NOT_EXIST_TMPL`])
/// formatted with the path.
pub fn check_file_exist(path: impl AsRef<Path>, msg_tmpl: Option<&str>) -> Result<()> {
    let path = path.as_ref();
    if path.is_file() {
        return Ok(());
    }
    let tmpl = msg_tmpl.unwrap_or(FILE_NOT_EXIST_TMPL);
    Err(Error::FileAccess {
        path: path.to_path_buf(),
        message: tmpl.replacen("{}", &path.display().to_string(), 1),
    })
}

/// Opens an existing regular file for reading.
///
/// # Errors
/// Returns [`Error::FileAccess`] if `path` does not exist or is a directory.
pub fn fopen(path: impl AsRef<Path>) -> Result<File> {
    let path = path.as_ref();
    check_file_exist(path, None).map_err(|_| Error::FileAccess {
        path: path.to_path_buf(),
        message: format!(
            "`{}` should be an existing file and not a directory",
            path.display()
        ),
    })?;
    Ok(File::open(path)?)
}

/// Creates `dir` and its parents, doing nothing if it already exists.
///
/// An empty path is a no-op; a leading `~` or `$HOME` is expanded.
pub fn mkdir_or_exist(dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    if !is_filepath(dir) {
        return Ok(());
    }
    fs::create_dir_all(expand_home(dir))?;
    Ok(())
}

/// Like [`mkdir_or_exist`] but creates missing directories with `mode`
/// (still subject to the process umask).
#[cfg(unix)]
pub fn mkdir_or_exist_with_mode(dir: impl AsRef<Path>, mode: u32) -> Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    let dir = dir.as_ref();
    if !is_filepath(dir) {
        return Ok(());
    }
    fs::DirBuilder::new()
        .recursive(true)
        .mode(mode)
        .create(expand_home(dir))?;
    Ok(())
}

/// Creates a symbolic link at `dst` pointing to `src`.
///
/// With `overwrite`, anything already at `dst` (a dangling link included) is
/// removed first. Without it, an existing `dst` makes link creation fail with
/// [`io::ErrorKind::AlreadyExists`].
pub fn symlink(src: impl AsRef<Path>, dst: impl AsRef<Path>, overwrite: bool) -> Result<()> {
    let (src, dst) = (src.as_ref(), dst.as_ref());
    if overwrite {
        match fs::symlink_metadata(dst) {
            Ok(meta) if meta.is_dir() => fs::remove_dir(dst)?,
            Ok(_) => fs::remove_file(dst)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    create_symlink(src, dst)?;
    Ok(())
}

#[cfg(unix)]
fn create_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

#[cfg(windows)]
fn create_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    let resolved = dst.parent().map(|p| p.join(src)).unwrap_or_else(|| src.into());
    if resolved.is_dir() {
        std::os::windows::fs::symlink_dir(src, dst)
    } else {
        std::os::windows::fs::symlink_file(src, dst)
    }
}

/// Finds the nearest directory, `path` itself included, that contains one of
/// `markers`. A file path starts the search at its parent.
///
/// Returns `None` once the filesystem root has been checked.
pub fn find_vcs_root<S: AsRef<str>>(
    path: impl AsRef<Path>,
    markers: &[S],
) -> Result<Option<PathBuf>> {
    let path = path.as_ref();
    let start = if path.is_file() {
        path.parent().unwrap_or_else(|| Path::new(""))
    } else {
        path
    };
    let mut cur = absolute(start)?;
    loop {
        if markers.iter().any(|m| cur.join(AsRef::<str>::as_ref(m)).exists()) {
            return Ok(Some(cur));
        }
        match cur.parent() {
            Some(parent) => cur = parent.to_path_buf(),
            None => return Ok(None),
        }
    }
}

/// Expands `path` (see [`expand_home`]) and makes it absolute against the
/// current directory, normalising `.` and `..` lexically.
pub fn absolute(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = expand_home(path.as_ref());
    let abs_path = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()?.join(path)
    };
    Ok(abs_path.clean())
}

/// Replaces a leading `~` or `$HOME` with the user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    let Some(input) = path.to_str() else {
        return path.to_path_buf();
    };
    for marker in ["~", "$HOME"] {
        let Some(rest) = input.strip_prefix(marker) else {
            continue;
        };
        if !(rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\')) {
            continue;
        }
        if let Some(home) = dirs::home_dir() {
            return home.join(rest.trim_start_matches(['/', '\\']));
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_is_filepath() {
        assert!(is_filepath("a/b"));
        assert!(is_filepath(Path::new("/")));
        assert!(!is_filepath(""));
    }

    #[test]
    fn test_check_file_exist() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let file = temp_dir.path().join("cfg.toml");
        fs::write(&file, "x = 1")?;
        check_file_exist(&file, None)?;

        let err = check_file_exist(temp_dir.path(), None).unwrap_err();
        assert!(err.to_string().contains("not exist or is a directory"));

        let missing = temp_dir.path().join("nope");
        let err = check_file_exist(&missing, Some("missing: {}")).unwrap_err();
        assert_eq!(err.to_string(), format!("missing: {}", missing.display()));
        Ok(())
    }

    #[test]
    fn test_fopen() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let file = temp_dir.path().join("notes.txt");
        fs::write(&file, "hello")?;
        let mut content = String::new();
        io::Read::read_to_string(&mut fopen(&file)?, &mut content)?;
        assert_eq!(content, "hello");

        assert!(matches!(
            fopen(temp_dir.path()),
            Err(Error::FileAccess { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_mkdir_or_exist() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let dir = temp_dir.path().join("a/b/c");
        mkdir_or_exist(&dir)?;
        assert!(dir.is_dir());
        mkdir_or_exist(&dir)?;
        mkdir_or_exist("")?;
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_mkdir_or_exist_with_mode() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new()?;
        let dir = temp_dir.path().join("private");
        mkdir_or_exist_with_mode(&dir, 0o700)?;
        let mode = fs::metadata(&dir)?.permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_overwrite() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let target = temp_dir.path().join("latest_run");
        fs::create_dir(&target)?;
        let link = temp_dir.path().join("latest");
        std::os::unix::fs::symlink(temp_dir.path().join("gone"), &link)?;

        symlink(&target, &link, true)?;
        assert_eq!(fs::read_link(&link)?, target);

        let err = symlink(&target, &link, false).unwrap_err();
        assert!(matches!(err, Error::Io(ref e) if e.kind() == io::ErrorKind::AlreadyExists));
        Ok(())
    }

    #[test]
    fn test_find_vcs_root() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().canonicalize()?;
        fs::create_dir_all(root.join(".git"))?;
        fs::create_dir_all(root.join("src/nested"))?;
        fs::write(root.join("src/nested/lib.rs"), "")?;

        assert_eq!(find_vcs_root(root.join("src/nested"), &[".git"])?, Some(root.clone()));
        assert_eq!(find_vcs_root(root.join("src/nested/lib.rs"), &[".git"])?, Some(root.clone()));
        assert_eq!(
            find_vcs_root(root.join("src/nested"), &["no-such-marker-1c6f"])?,
            None
        );
        Ok(())
    }

    #[test]
    fn test_expand_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(expand_home(Path::new("~")), home);
        assert_eq!(expand_home(Path::new("~/runs")), home.join("runs"));
        assert_eq!(expand_home(Path::new("$HOME/runs")), home.join("runs"));
        assert_eq!(expand_home(Path::new("~user/x")), PathBuf::from("~user/x"));
        assert_eq!(expand_home(Path::new("rel")), PathBuf::from("rel"));
    }

    #[cfg(unix)]
    #[test]
    fn test_absolute_cleans_dots() -> Result<()> {
        let abs = absolute("/tmp/a/../b/./c")?;
        assert_eq!(abs, PathBuf::from("/tmp/b/c"));
        Ok(())
    }
}
