//! Media transfer: copy images out of MediaWiki's hashed upload tree.
//!
//! MediaWiki does not store uploads under their plain names. Each file lives
//! at `images/<h1>/<h1h2>/<name>` where `h1h2` are the first two hex digits
//! of the MD5 of the stored title — a scheme chosen to keep directory fan-out
//! bounded on large wikis. The importer recomputes that path rather than
//! walking the tree, so a missing file is detected per item and reported,
//! never fatal.

use crate::error::ItemError;
use crate::pipeline::sink::{clean_id, DokuWikiTree};
use md5::{Digest, Md5};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The hashed location of an upload inside the MediaWiki images directory.
pub fn hashed_upload_path(images_dir: &Path, title: &str) -> PathBuf {
    let digest = format!("{:x}", Md5::digest(title.as_bytes()));
    images_dir
        .join(&digest[..1])
        .join(&digest[..2])
        .join(title)
}

/// Copy one image into the DokuWiki media namespace.
///
/// Returns the destination path; for a dry run, the path that would have
/// been written.
pub fn copy_media(
    tree: &DokuWikiTree,
    images_dir: &Path,
    title: &str,
    namespace: &str,
    overwrite: bool,
    dry_run: bool,
) -> Result<PathBuf, ItemError> {
    let src = hashed_upload_path(images_dir, title);
    if !src.is_file() {
        return Err(ItemError::MediaMissing {
            title: title.to_string(),
            path: src,
        });
    }

    let id = clean_id(title);
    if id.is_empty() {
        return Err(ItemError::MediaCopyFailed {
            title: title.to_string(),
            detail: "title cleans to an empty media id".to_string(),
        });
    }

    let dst = tree.media_path(namespace, &id);
    if dst.exists() && !overwrite {
        return Err(ItemError::MediaExists {
            title: title.to_string(),
            path: dst,
        });
    }

    if dry_run {
        info!("dry-run: would copy {} -> {}", src.display(), dst.display());
        return Ok(dst);
    }

    let copy_err = |e: std::io::Error| ItemError::MediaCopyFailed {
        title: title.to_string(),
        detail: e.to_string(),
    };

    if let Some(parent) = dst.parent() {
        std::fs::create_dir_all(parent).map_err(copy_err)?;
    }
    std::fs::copy(&src, &dst).map_err(copy_err)?;

    debug!("Copied media {} -> {}", src.display(), dst.display());
    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_path_uses_md5_prefix_dirs() {
        // md5("abc") = 900150983cd24fb0d6963f7d28e17f72
        assert_eq!(
            hashed_upload_path(Path::new("/wiki/images"), "abc"),
            PathBuf::from("/wiki/images/9/90/abc")
        );
    }

    #[test]
    fn hashed_path_second_dir_extends_first() {
        let path = hashed_upload_path(Path::new("images"), "Example.jpg");
        let parts: Vec<String> = path
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[1].len(), 1);
        assert_eq!(parts[2].len(), 2);
        assert!(parts[2].starts_with(&parts[1]));
        assert_eq!(parts[3], "Example.jpg");
    }

    fn fixture() -> (tempfile::TempDir, DokuWikiTree, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let dokuwiki = dir.path().join("dokuwiki");
        std::fs::create_dir_all(dokuwiki.join("data/pages")).unwrap();
        std::fs::create_dir_all(dokuwiki.join("data/media")).unwrap();
        let tree = DokuWikiTree::open(&dokuwiki).unwrap();

        let images = dir.path().join("mediawiki/images");
        let src = hashed_upload_path(&images, "Logo.png");
        std::fs::create_dir_all(src.parent().unwrap()).unwrap();
        std::fs::write(&src, b"png-bytes").unwrap();

        (dir, tree, images)
    }

    #[test]
    fn copies_into_media_namespace() {
        let (_dir, tree, images) = fixture();
        let dst = copy_media(&tree, &images, "Logo.png", "wiki", false, false).unwrap();

        assert!(dst.ends_with("data/media/wiki/logo.png"));
        assert_eq!(std::fs::read(&dst).unwrap(), b"png-bytes");
    }

    #[test]
    fn missing_source_is_skippable() {
        let (_dir, tree, images) = fixture();
        let err = copy_media(&tree, &images, "Ghost.png", "wiki", false, false).unwrap_err();
        assert!(matches!(err, ItemError::MediaMissing { .. }));
    }

    #[test]
    fn existing_destination_is_skippable() {
        let (_dir, tree, images) = fixture();
        copy_media(&tree, &images, "Logo.png", "wiki", false, false).unwrap();
        let err = copy_media(&tree, &images, "Logo.png", "wiki", false, false).unwrap_err();
        assert!(matches!(err, ItemError::MediaExists { .. }));
    }

    #[test]
    fn overwrite_replaces_destination() {
        let (_dir, tree, images) = fixture();
        let dst = copy_media(&tree, &images, "Logo.png", "wiki", false, false).unwrap();
        std::fs::write(hashed_upload_path(&images, "Logo.png"), b"new-bytes").unwrap();

        copy_media(&tree, &images, "Logo.png", "wiki", true, false).unwrap();
        assert_eq!(std::fs::read(&dst).unwrap(), b"new-bytes");
    }

    #[test]
    fn dry_run_copies_nothing() {
        let (_dir, tree, images) = fixture();
        let dst = copy_media(&tree, &images, "Logo.png", "wiki", false, true).unwrap();
        assert!(!dst.exists());
    }
}
