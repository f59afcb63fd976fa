//! Resolution of absolute daemon paths beneath a deployment root

use std::path::{Path, PathBuf};

/// Re-anchor an absolute path such as `/etc/postfix` under `root`.
///
/// With a root of `/` the path is returned unchanged; any other root
/// redirects the whole deployment, e.g. into a staging tree.
pub fn rooted(root: &Path, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    match path.strip_prefix("/") {
        Ok(relative) => root.join(relative),
        Err(_) => root.join(path),
    }
}
