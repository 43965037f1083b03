//! Tests for multipart parsing and upload storage.

#[cfg(test)]
mod multipart_tests {
    use std::fs;

    use tempfile::TempDir;

    use crate::multipart::{
        boundary_from_content_type, extract_files, parse_parts, sanitize_filename, store_files,
        ContentDisposition, Error, UploadedFile,
    };
    use crate::share::ShareRoot;

    const BOUNDARY: &str = "----WebKitFormBoundary7MA4YWxkTrZu0gW";

    fn file_part(field: &str, filename: &str, content: &[u8]) -> Vec<u8> {
        let mut part = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        part.extend_from_slice(content);
        part.extend_from_slice(b"\r\n");
        part
    }

    fn closing() -> Vec<u8> {
        format!("--{BOUNDARY}--\r\n").into_bytes()
    }

    #[test]
    fn test_boundary_from_content_type() {
        let boundary = boundary_from_content_type("multipart/form-data; boundary=abc123").unwrap();
        assert_eq!(boundary, "abc123");

        let boundary = boundary_from_content_type("multipart/form-data; charset=utf-8; Boundary=\"a;b c\"").unwrap();
        assert_eq!(boundary, "a;b c");
    }

    #[test]
    fn test_missing_boundary() {
        assert!(matches!(boundary_from_content_type("multipart/form-data"), Err(Error::MissingBoundary)));
        assert!(matches!(boundary_from_content_type("multipart/form-data; boundary=\"\""), Err(Error::MissingBoundary)));
    }

    #[test]
    fn test_parse_single_file_part() {
        let mut body = file_part("file", "report.txt", b"hello");
        body.extend(closing());

        let parts = parse_parts(&body, BOUNDARY).unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].body, b"hello");
        assert_eq!(parts[0].header("Content-Type"), Some("application/octet-stream"));

        let disposition = parts[0].content_disposition().unwrap();
        assert_eq!(disposition.kind, "form-data");
        assert_eq!(disposition.name.as_deref(), Some("file"));
        assert_eq!(disposition.filename.as_deref(), Some("report.txt"));
    }

    #[test]
    fn test_only_one_trailing_line_ending_is_removed() {
        let mut body = file_part("file", "lines.txt", b"one\r\ntwo\r\n\r\n");
        body.extend(closing());

        let parts = parse_parts(&body, BOUNDARY).unwrap();
        assert_eq!(parts[0].body, b"one\r\ntwo\r\n\r\n");
    }

    #[test]
    fn test_binary_content_with_boundary_like_bytes() {
        let content = format!("\x00\x01--{BOUNDARY}\x02").into_bytes();
        let mut body = file_part("file", "blob.bin", &content);
        body.extend(closing());

        let parts = parse_parts(&body, BOUNDARY).unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].body, content);
    }

    #[test]
    fn test_boundary_prefix_inside_content_is_not_a_delimiter() {
        let content = format!("line\r\n--{BOUNDARY}x tail\r\n--{BOUNDARY}-").into_bytes();
        let mut body = file_part("file", "notes.txt", &content);
        body.extend(closing());

        let parts = parse_parts(&body, BOUNDARY).unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].body, content);
    }

    #[test]
    fn test_delimiter_with_trailing_whitespace() {
        let body = format!(
            "--{BOUNDARY} \t\r\nContent-Disposition: form-data; name=\"file\"; filename=\"pad.txt\"\r\n\r\nok\r\n--{BOUNDARY}--\r\n"
        );
        let parts = parse_parts(body.as_bytes(), BOUNDARY).unwrap();
        assert_eq!(parts[0].body, b"ok");
    }

    #[test]
    fn test_preamble_epilogue_and_text_fields() {
        let mut body = b"This is the preamble.\r\n".to_vec();
        body.extend(format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhi\r\n").into_bytes());
        body.extend(file_part("file", "a.txt", b"A"));
        body.extend(closing());
        body.extend_from_slice(b"epilogue");

        let parts = parse_parts(&body, BOUNDARY).unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].body, b"hi");

        let files = extract_files(parts).unwrap();
        assert_eq!(files, vec![UploadedFile { filename: "a.txt".to_string(), content: b"A".to_vec() }]);
    }

    #[test]
    fn test_bare_lf_line_endings() {
        let body = format!(
            "--{BOUNDARY}\nContent-Disposition: form-data; name=\"file\"; filename=\"lf.txt\"\n\nbody\n--{BOUNDARY}--\n"
        );
        let parts = parse_parts(body.as_bytes(), BOUNDARY).unwrap();
        assert_eq!(parts[0].body, b"body");
    }

    #[test]
    fn test_body_without_delimiter_is_malformed() {
        let result = parse_parts(b"just some bytes", BOUNDARY);
        assert!(matches!(result, Err(Error::Malformed(_))));
    }

    #[test]
    fn test_truncated_body_is_malformed() {
        let body = file_part("file", "cut.txt", b"partial");
        assert!(matches!(parse_parts(&body, BOUNDARY), Err(Error::Malformed(_))));
    }

    #[test]
    fn test_unterminated_headers_are_malformed() {
        let body = format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"--{BOUNDARY}--");
        assert!(matches!(parse_parts(body.as_bytes(), BOUNDARY), Err(Error::Malformed(_))));
    }

    #[test]
    fn test_part_without_filename_is_no_file() {
        let mut body = format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"\r\n\r\nhello\r\n").into_bytes();
        body.extend(closing());

        let parts = parse_parts(&body, BOUNDARY).unwrap();
        assert!(matches!(extract_files(parts), Err(Error::NoFileFound)));
    }

    #[test]
    fn test_other_field_names_are_ignored() {
        let mut body = file_part("avatar", "me.png", b"png");
        body.extend(closing());

        let parts = parse_parts(&body, BOUNDARY).unwrap();
        assert!(matches!(extract_files(parts), Err(Error::NoFileFound)));
    }

    #[test]
    fn test_empty_file_input_is_no_file() {
        let mut body = file_part("file", "", b"");
        body.extend(closing());

        let parts = parse_parts(&body, BOUNDARY).unwrap();
        assert!(matches!(extract_files(parts), Err(Error::NoFileFound)));
    }

    #[test]
    fn test_content_disposition_parsing() {
        let cd = ContentDisposition::parse(r#"form-data; name="file"; filename="semi;colon \"quoted\".txt""#);
        assert_eq!(cd.filename.as_deref(), Some(r#"semi;colon "quoted".txt"#));

        let cd = ContentDisposition::parse("form-data; name=file; filename=\"x.txt\"; filename*=UTF-8''r%C3%A9sum%C3%A9.pdf");
        assert_eq!(cd.name.as_deref(), Some("file"));
        assert_eq!(cd.filename.as_deref(), Some("résumé.pdf"));
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("report.txt").as_deref(), Some("report.txt"));
        assert_eq!(sanitize_filename("../../etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(sanitize_filename(r"C:\Users\me\photo.jpg").as_deref(), Some("photo.jpg"));
        assert_eq!(sanitize_filename("  spaced.txt ").as_deref(), Some("spaced.txt"));
        assert_eq!(sanitize_filename("dir/"), None);
        assert_eq!(sanitize_filename(".."), None);
        assert_eq!(sanitize_filename("."), None);
        assert_eq!(sanitize_filename(""), None);
        assert_eq!(sanitize_filename("bad\0name"), None);
        assert_eq!(sanitize_filename("nul.txt"), None);
        assert_eq!(sanitize_filename("console.txt").as_deref(), Some("console.txt"));
    }

    #[test]
    fn test_traversal_filename_is_written_inside_root() {
        let mut body = file_part("file", "../../evil.txt", b"x");
        body.extend(closing());

        let files = extract_files(parse_parts(&body, BOUNDARY).unwrap()).unwrap();
        assert_eq!(files[0].filename, "evil.txt");
    }

    #[tokio::test]
    async fn test_store_files_writes_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let root = ShareRoot::new(dir.path()).unwrap();
        fs::write(dir.path().join("report.txt"), b"old contents").unwrap();

        let files = vec![UploadedFile { filename: "report.txt".to_string(), content: b"hello".to_vec() }];
        let written = store_files(&root, &files).await.unwrap();

        assert_eq!(written, vec![root.path().join("report.txt")]);
        assert_eq!(fs::read(dir.path().join("report.txt")).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_store_files_aborts_on_first_failure() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("taken")).unwrap();
        let root = ShareRoot::new(dir.path()).unwrap();

        let files = vec![
            UploadedFile { filename: "taken".to_string(), content: b"1".to_vec() },
            UploadedFile { filename: "after.txt".to_string(), content: b"2".to_vec() },
        ];
        let result = store_files(&root, &files).await;

        assert!(matches!(result, Err(Error::WriteDenied { ref filename, .. }) if filename == "taken"));
        assert!(!dir.path().join("after.txt").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_store_files_refuses_dangling_symlink() {
        let outside = TempDir::new().unwrap();
        let escaped = outside.path().join("pwned.txt");

        let dir = TempDir::new().unwrap();
        std::os::unix::fs::symlink(&escaped, dir.path().join("report.txt")).unwrap();
        let root = ShareRoot::new(dir.path()).unwrap();

        let files = vec![UploadedFile { filename: "report.txt".to_string(), content: b"hello".to_vec() }];
        let result = store_files(&root, &files).await;

        assert!(matches!(result, Err(Error::WriteDenied { .. })));
        assert!(!escaped.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_store_files_permission_denied() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o555)).unwrap();

        // Privileged users bypass directory permissions
        if fs::write(dir.path().join("marker"), b"").is_ok() {
            fs::remove_file(dir.path().join("marker")).unwrap();
            fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let root = ShareRoot::new(dir.path()).unwrap();
        let files = vec![UploadedFile { filename: "denied.txt".to_string(), content: b"x".to_vec() }];
        let result = store_files(&root, &files).await;

        assert!(matches!(result, Err(Error::WriteDenied { .. })));
        assert!(!dir.path().join("denied.txt").exists());
        fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o755)).unwrap();
    }
}
