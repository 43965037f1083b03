//! Tests for share root resolution.

#[cfg(test)]
mod share_tests {
    use std::fs;

    use tempfile::TempDir;

    use crate::share::ShareRoot;

    fn sample_root() -> (TempDir, ShareRoot) {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("docs").join("a.txt"), b"a").unwrap();
        fs::write(dir.path().join("top.txt"), b"top").unwrap();
        let root = ShareRoot::new(dir.path()).unwrap();
        (dir, root)
    }

    #[test]
    fn test_new_rejects_missing_and_non_directory() {
        let dir = TempDir::new().unwrap();
        assert!(ShareRoot::new(dir.path().join("missing")).is_err());

        let file = dir.path().join("file.txt");
        fs::write(&file, b"x").unwrap();
        assert!(ShareRoot::new(&file).is_err());
    }

    #[tokio::test]
    async fn test_resolve_root_and_children() {
        let (_dir, root) = sample_root();

        assert_eq!(root.resolve("/").await.unwrap(), root.path());
        assert_eq!(root.resolve("").await.unwrap(), root.path());
        assert_eq!(root.resolve("/docs/").await.unwrap(), root.path().join("docs"));
        assert_eq!(root.resolve("/docs/a.txt").await.unwrap(), root.path().join("docs").join("a.txt"));
        assert!(root.resolve("/nope.txt").await.is_none());
    }

    #[tokio::test]
    async fn test_resolve_allows_dot_dot_that_stays_inside() {
        let (_dir, root) = sample_root();
        assert_eq!(root.resolve("/docs/../top.txt").await.unwrap(), root.path().join("top.txt"));
    }

    #[tokio::test]
    async fn test_resolve_rejects_escape() {
        let (_dir, root) = sample_root();
        assert!(root.resolve("/../../etc/passwd").await.is_none());
        assert!(root.resolve("/docs/../../../etc/passwd").await.is_none());
        assert!(root.resolve("/..").await.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_resolve_rejects_symlink_out_of_root() {
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("secret.txt"), b"secret").unwrap();

        let (dir, root) = sample_root();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();

        assert!(root.resolve("/link/secret.txt").await.is_none());
        assert!(root.upload_target("link").await.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_upload_target_rejects_dangling_symlink() {
        let outside = TempDir::new().unwrap();
        let escaped = outside.path().join("pwned.txt");

        let (dir, root) = sample_root();
        std::os::unix::fs::symlink(&escaped, dir.path().join("report.txt")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.txt"), dir.path().join("inner.txt")).unwrap();

        assert!(root.upload_target("report.txt").await.is_none());
        assert!(root.upload_target("inner.txt").await.is_none());
        assert!(!escaped.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_upload_target_follows_symlink_inside_root() {
        let (dir, root) = sample_root();
        std::os::unix::fs::symlink(dir.path().join("top.txt"), dir.path().join("alias.txt")).unwrap();

        assert_eq!(root.upload_target("alias.txt").await.unwrap(), root.path().join("top.txt"));
    }

    #[tokio::test]
    async fn test_upload_target() {
        let (_dir, root) = sample_root();
        assert_eq!(root.upload_target("new.bin").await.unwrap(), root.path().join("new.bin"));
        assert_eq!(root.upload_target("top.txt").await.unwrap(), root.path().join("top.txt"));
        assert!(root.upload_target("docs").await.is_none());
    }

    #[test]
    fn test_url_path() {
        let (_dir, root) = sample_root();
        assert_eq!(root.url_path(root.path()), "/");
        assert_eq!(root.url_path(&root.path().join("docs")), "/docs");
        assert_eq!(root.url_path(&root.path().join("docs").join("a.txt")), "/docs/a.txt");
    }
}
