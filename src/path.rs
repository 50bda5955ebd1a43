use std::path::{Path, PathBuf};

/// Resolve `relative` against the directory holding `document`.
///
/// Both `/` and `\` separate segments and every `..` pops one directory. Pure
/// path composition: nothing is checked on disk.
pub fn resolve_relative(document: &Path, relative: &str) -> PathBuf {
    let mut result = document
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    for segment in relative.split(['/', '\\']).filter(|s| !s.is_empty()) {
        match segment {
            ".." => {
                result.pop();
            }
            "." => {}
            name => result.push(name),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_next_to_the_document() {
        let p = resolve_relative(Path::new("maps/level.tmj"), "tiles.png");
        assert_eq!(p, PathBuf::from("maps/tiles.png"));
    }

    #[test]
    fn parent_segments_pop_a_level() {
        let p = resolve_relative(Path::new("assets/maps/level.tmj"), "../img/./tiles.png");
        assert_eq!(p, PathBuf::from("assets/img/tiles.png"));
    }

    #[test]
    fn accepts_backslash_separators() {
        let p = resolve_relative(Path::new("maps/level.tmj"), "..\\tilesets\\forest.tsj");
        assert_eq!(p, PathBuf::from("tilesets/forest.tsj"));
    }
}
