//! Icons shown next to listing entries.

/// Icon for directories.
pub const FOLDER_ICON: &str = "📁";

/// Icon for a file, chosen by its (case-insensitive) extension.
pub fn file_icon(name: &str) -> &'static str {
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" | "png" | "gif" | "webp" | "svg" | "ico" | "heic" => "🖼️",
        "mp4" | "mov" | "avi" | "mkv" | "wmv" | "flv" | "webm" => "🎬",
        "mp3" | "wav" | "flac" | "aac" | "m4a" | "ogg" => "🎵",
        "pdf" => "📕",
        "doc" | "docx" => "📘",
        "xls" | "xlsx" | "csv" => "📗",
        "ppt" | "pptx" => "📙",
        "md" => "📝",
        "rs" | "py" | "js" | "ts" | "c" | "cpp" | "h" | "go" | "java" | "swift" => "💻",
        "html" | "htm" => "🌐",
        "json" | "xml" | "toml" | "yaml" | "yml" => "📋",
        "zip" | "rar" | "tar" | "gz" | "7z" | "xz" => "📦",
        "dmg" | "iso" => "💿",
        "exe" | "msi" | "app" | "apk" => "⚙️",
        _ => "📄",
    }
}
