use assert_fs::TempDir;
use assert_fs::prelude::*;
use snapkit::{Error, ScanRequest, scandir};

fn tree() -> Result<TempDir, Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    temp.child("a.py").write_str("")?;
    temp.child("b.txt").write_str("")?;
    temp.child(".hidden.py").write_str("")?;
    temp.child("sub/c.py").write_str("")?;
    temp.child("sub/deeper/d.py").write_str("")?;
    temp.child("sub/.cache/e.py").write_str("")?;
    temp.child(".venv/lib/site.py").write_str("")?;
    Ok(temp)
}

fn sorted(scan: snapkit::Scan) -> Result<Vec<String>, Error> {
    let mut paths = scan.collect::<Result<Vec<_>, _>>()?;
    paths.sort();
    Ok(paths)
}

#[cfg(unix)]
#[test]
fn suffix_filter_recursive() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tree()?;
    let paths = sorted(scandir(temp.path(), None, Some(".py".into()), true)?)?;
    assert_eq!(paths, vec!["a.py", "sub/c.py", "sub/deeper/d.py"]);
    Ok(())
}

#[test]
fn every_visible_file_without_filters() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tree()?;
    let recursive = sorted(ScanRequest::new(temp.path()).recursive(true).scan()?)?;
    assert_eq!(recursive.len(), 4);
    assert!(recursive.iter().all(|p| !p.contains(".hidden") && !p.contains(".cache")));

    let flat = sorted(ScanRequest::new(temp.path()).scan()?)?;
    assert_eq!(flat, vec!["a.py", "b.txt"]);
    Ok(())
}

#[test]
fn prefix_tuple_matches_any() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tree()?;
    let paths = sorted(
        ScanRequest::new(temp.path())
            .prefix(["a", "b"])
            .recursive(true)
            .scan()?,
    )?;
    assert_eq!(paths, vec!["a.py", "b.txt"]);
    Ok(())
}

#[test]
fn scan_is_lazy() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tree()?;
    let mut scan = ScanRequest::new(temp.path()).recursive(true).scan()?;
    assert!(scan.next().is_some());
    Ok(())
}

#[test]
fn missing_root_is_rejected() {
    let temp = TempDir::new().unwrap();
    let result = ScanRequest::new(temp.path().join("nope")).scan();
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

#[cfg(unix)]
#[test]
fn symlinked_file_counts_as_a_file() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    temp.child("real/model.py").write_str("")?;
    temp.child("root").create_dir_all()?;
    std::os::unix::fs::symlink("../real/model.py", temp.path().join("root/link.py"))?;

    let paths = sorted(ScanRequest::new(temp.path().join("root")).scan()?)?;
    assert_eq!(paths, vec!["link.py"]);
    Ok(())
}

#[cfg(unix)]
#[test]
fn symlinked_directory_is_descended_when_recursive() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    temp.child("shared/layers.py").write_str("")?;
    temp.child("root/a.py").write_str("")?;
    std::os::unix::fs::symlink("../shared", temp.path().join("root/shared"))?;

    let root = temp.path().join("root");
    let recursive = sorted(ScanRequest::new(&root).suffix(".py").recursive(true).scan()?)?;
    assert_eq!(recursive, vec!["a.py", "shared/layers.py"]);

    let flat = sorted(ScanRequest::new(&root).scan()?)?;
    assert_eq!(flat, vec!["a.py"]);
    Ok(())
}
