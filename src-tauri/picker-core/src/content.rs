//! ContentResolver / 存储目录抽象。由插件侧通过 PluginHandle 实现并传入 UriResolver。

use crate::error::Result;

/// MediaStore.MediaColumns.DATA
pub const COLUMN_DATA: &str = "_data";
/// OpenableColumns.DISPLAY_NAME
pub const COLUMN_DISPLAY_NAME: &str = "_display_name";

pub const FLAG_GRANT_READ_URI_PERMISSION: i32 = 0x0000_0001;
pub const FLAG_GRANT_WRITE_URI_PERMISSION: i32 = 0x0000_0002;

/// 查询结果游标
pub trait Cursor: Send {
    fn move_to_first(&mut self) -> bool;
    fn column_index_or_throw(&self, column: &str) -> Result<usize>;
    fn get_string(&self, column_index: usize) -> Option<String>;
    fn close(&mut self);
}

pub trait ContentResolver: Send + Sync {
    /// 同步查询；provider 不返回游标时为 Ok(None)
    fn query(
        &self,
        uri: &str,
        projection: &[&str],
        selection: Option<&str>,
        selection_args: &[String],
    ) -> Result<Option<Box<dyn Cursor>>>;

    fn take_persistable_uri_permission(&self, uri: &str, mode_flags: i32) -> Result<()>;
}

/// Environment / Context 提供的存储目录
pub trait StorageEnvironment: Send + Sync {
    /// Environment.getExternalStorageDirectory()
    fn external_storage_directory(&self) -> String;
    /// Environment.getExternalStoragePublicDirectory(DIRECTORY_DOWNLOADS)
    fn downloads_directory(&self) -> String;
    /// Context.getExternalMediaDirs()，主存储在前
    fn external_media_dirs(&self) -> Vec<String>;
}

/// 持有游标并保证在任何退出路径上关闭
pub struct CursorGuard {
    cursor: Box<dyn Cursor>,
}

impl CursorGuard {
    pub fn new(cursor: Box<dyn Cursor>) -> Self {
        Self { cursor }
    }

    /// 第一行中指定列的非空字符串
    pub fn first_string(&mut self, column: &str) -> Result<Option<String>> {
        if !self.cursor.move_to_first() {
            return Ok(None);
        }
        let index = self.cursor.column_index_or_throw(column)?;
        Ok(self.cursor.get_string(index).filter(|s| !s.is_empty()))
    }
}

impl Drop for CursorGuard {
    fn drop(&mut self) {
        self.cursor.close();
    }
}
