use crate::score::ScoreAssetPair;
use std::fs;
use std::io;
use std::path::Path;

/// Characters that cannot appear in a file or directory name on common filesystems
const ILLEGAL_NAME_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Count the entries (files and directories) directly under `dir`.
///
/// A directory that does not exist yet holds zero entries.
pub fn count_entries(dir: &Path) -> io::Result<usize> {
    match fs::read_dir(dir) {
        Ok(entries) => Ok(entries.filter_map(Result::ok).count()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
        Err(e) => Err(e),
    }
}

/// Strip path-illegal characters (`<>:"/\|?*` and U+0000..=U+001F) from a score name
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !ILLEGAL_NAME_CHARS.contains(c) && !('\u{0}'..='\u{1f}').contains(c))
        .collect()
}

/// Write both halves of a score pair under `<root>/<name>/`, PNG first.
///
/// Existing files are overwritten. A failure between the two writes leaves
/// the PNG on disk without its SVG.
pub async fn write_asset_pair(
    root: &Path,
    pair: &ScoreAssetPair,
    png: &[u8],
    svg: &[u8],
) -> io::Result<()> {
    tokio::fs::create_dir_all(pair.dir(root)).await?;
    tokio::fs::write(pair.png_path(root), png).await?;
    tokio::fs::write(pair.svg_path(root), svg).await?;
    Ok(())
}
