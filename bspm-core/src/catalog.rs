//! 源文件目录扫描
//!
//! 只收集目录下直接包含的 `.cpp` / `.cppm` 普通文件，不递归子目录。

use std::path::Path;

use bspm_vfs::VirtualFileSystem;
use tracing::{debug, trace};

use crate::error::{CoreError, CoreResult};
use crate::unit::{TranslationUnit, UnitKind};

/// 扫描目录，返回候选翻译单元
///
/// `discovery_index` 保留文件系统原生的遍历顺序。返回序列经过稳定分区，
/// 接口单元排在实现单元之前；这只是排序器的初始遍历顺序，不是强制约束。
pub fn discover(fs: &dyn VirtualFileSystem, dir: &Path) -> CoreResult<Vec<TranslationUnit>> {
    if !fs.is_dir(dir) {
        return Err(CoreError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut units = Vec::new();
    for entry in fs.read_dir(dir)? {
        if !entry.is_file {
            continue;
        }
        let Some(kind) = entry.extension().and_then(UnitKind::from_extension) else {
            trace!(target: "bspm::catalog", path = %entry.path.display(), "skipped");
            continue;
        };
        let index = units.len();
        debug!(
            target: "bspm::catalog",
            path = %entry.path.display(),
            kind = kind.as_str(),
            index,
            "discovered"
        );
        units.push(TranslationUnit::new(entry.path, kind, index));
    }

    let (mut ordered, implementations): (Vec<_>, Vec<_>) = units
        .into_iter()
        .partition(|u| u.kind == UnitKind::Interface);
    ordered.extend(implementations);

    debug!(target: "bspm::catalog", count = ordered.len(), dir = %dir.display(), "catalog complete");
    Ok(ordered)
}
