//! content:// / file:// URI 到本地路径的解析。
//!
//! 按 provider 分类（外部存储文档、下载文档、媒体库文档、普通 content、file），
//! 需要查询的分类通过 [`ContentResolver`] 同步查询
//! `_data` / `_display_name` 列。

use percent_encoding::percent_decode_str;
use std::sync::Arc;
use url::Url;

use crate::content::{
    ContentResolver, CursorGuard, StorageEnvironment, COLUMN_DATA, COLUMN_DISPLAY_NAME,
    FLAG_GRANT_READ_URI_PERMISSION, FLAG_GRANT_WRITE_URI_PERMISSION,
};
use crate::error::Result;
use crate::strategy::API_KITKAT;

pub const EXTERNAL_STORAGE_AUTHORITY: &str = "com.android.externalstorage.documents";
pub const DOWNLOADS_AUTHORITY: &str = "com.android.providers.downloads.documents";
pub const MEDIA_AUTHORITY: &str = "com.android.providers.media.documents";

pub const IMAGES_EXTERNAL_CONTENT_URI: &str = "content://media/external/images/media";
pub const VIDEO_EXTERNAL_CONTENT_URI: &str = "content://media/external/video/media";
pub const AUDIO_EXTERNAL_CONTENT_URI: &str = "content://media/external/audio/media";

/// 次级外部存储上需要先持久化授权（API 23 以上）
const API_MARSHMALLOW: u32 = 23;

/// URI 所属的 provider 分类
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UriCategory {
    ExternalStorageDocument { document_id: String },
    DownloadsDocument,
    MediaStoreDocument { document_id: String },
    /// 其他 DocumentsProvider，无法映射到路径
    OtherDocument,
    GenericContent,
    RawFile { path: String },
    Unresolvable,
}

fn decode(segment: &str) -> String {
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}

/// DocumentsContract.getDocumentId：`/document/<id>` 或 `/tree/<tree>/document/<id>`
fn parse_document_id(url: &Url) -> Option<String> {
    let segments: Vec<&str> = url.path_segments()?.collect();
    match segments.as_slice() {
        ["document", id] => Some(decode(id)),
        ["tree", _, "document", id] => Some(decode(id)),
        _ => None,
    }
}

/// file URI 的原始路径，与 Uri.getPath 一致：只做百分号解码，不折叠 `.` / `..`。
/// opaque 形式（`file:a/b`）和没有路径的 URI 返回 None。
fn raw_file_path(uri: &str) -> Option<String> {
    let (_, rest) = uri.split_once(':')?;
    let rest = rest.find(['?', '#']).map_or(rest, |end| &rest[..end]);
    let path = match rest.strip_prefix("//") {
        Some(after_authority) => &after_authority[after_authority.find('/')?..],
        None if rest.starts_with('/') => rest,
        None => return None,
    };
    Some(decode(path))
}

/// 判断 URI 分类。
/// sdk_int < 19 时没有 DocumentsContract，文档 URI 按普通 content 处理。
pub fn classify(uri: &str, sdk_int: u32) -> UriCategory {
    let url = match Url::parse(uri) {
        Ok(url) => url,
        Err(_) => return UriCategory::Unresolvable,
    };

    match url.scheme() {
        "content" => {
            let document_id = if sdk_int >= API_KITKAT {
                parse_document_id(&url)
            } else {
                None
            };
            let Some(document_id) = document_id else {
                return UriCategory::GenericContent;
            };
            match url.host_str().unwrap_or_default() {
                EXTERNAL_STORAGE_AUTHORITY => UriCategory::ExternalStorageDocument { document_id },
                DOWNLOADS_AUTHORITY => UriCategory::DownloadsDocument,
                MEDIA_AUTHORITY => UriCategory::MediaStoreDocument { document_id },
                _ => UriCategory::OtherDocument,
            }
        }
        "file" => match raw_file_path(uri) {
            Some(path) => UriCategory::RawFile { path },
            None => UriCategory::Unresolvable,
        },
        _ => UriCategory::Unresolvable,
    }
}

/// 文档 ID 形如 `<type>:<rest>`
fn split_document_id(document_id: &str) -> (&str, Option<&str>) {
    match document_id.split_once(':') {
        Some((kind, rest)) => (kind, Some(rest)),
        None => (document_id, None),
    }
}

pub struct UriResolver {
    resolver: Arc<dyn ContentResolver>,
    environment: Arc<dyn StorageEnvironment>,
    sdk_int: u32,
}

impl UriResolver {
    pub fn new(
        resolver: Arc<dyn ContentResolver>,
        environment: Arc<dyn StorageEnvironment>,
        sdk_int: u32,
    ) -> Self {
        Self {
            resolver,
            environment,
            sdk_int,
        }
    }

    /// 解析为本地路径。无法解析时 Ok(None)；
    /// 查询异常只记录日志，授权等平台异常原样返回。
    pub fn resolve(&self, uri: &str) -> Result<Option<String>> {
        match classify(uri, self.sdk_int) {
            UriCategory::ExternalStorageDocument { document_id } => {
                self.resolve_external_storage(uri, &document_id)
            }
            UriCategory::DownloadsDocument => Ok(self
                .query_column(uri, COLUMN_DISPLAY_NAME, None, &[])
                .map(|name| format!("{}/{}", self.environment.downloads_directory(), name))),
            UriCategory::MediaStoreDocument { document_id } => {
                let (kind, id) = split_document_id(&document_id);
                let content_uri = match kind {
                    "image" => IMAGES_EXTERNAL_CONTENT_URI,
                    "video" => VIDEO_EXTERNAL_CONTENT_URI,
                    "audio" => AUDIO_EXTERNAL_CONTENT_URI,
                    other => {
                        log::debug!("未知的媒体文档类型 {}: {}", other, uri);
                        return Ok(None);
                    }
                };
                let args = [id.unwrap_or_default().to_string()];
                Ok(self.query_column(content_uri, COLUMN_DATA, Some("_id=?"), &args))
            }
            UriCategory::GenericContent => Ok(self.query_column(uri, COLUMN_DATA, None, &[])),
            UriCategory::RawFile { path } => Ok(Some(path)),
            UriCategory::OtherDocument | UriCategory::Unresolvable => Ok(None),
        }
    }

    fn resolve_external_storage(&self, uri: &str, document_id: &str) -> Result<Option<String>> {
        let (volume, rest) = split_document_id(document_id);
        let Some(rest) = rest else {
            return Ok(None);
        };

        if volume.eq_ignore_ascii_case("primary") {
            return Ok(Some(format!(
                "{}/{}",
                self.environment.external_storage_directory(),
                rest
            )));
        }

        if self.sdk_int <= API_MARSHMALLOW {
            return Ok(None);
        }

        self.resolver.take_persistable_uri_permission(
            uri,
            FLAG_GRANT_READ_URI_PERMISSION | FLAG_GRANT_WRITE_URI_PERMISSION,
        )?;

        // 第二个 media dir 位于 SD 卡上：取 "Android" 之前的卷根目录
        let dirs = self.environment.external_media_dirs();
        Ok(dirs.get(1).map(|dir| {
            let root = dir.find("Android").map(|i| &dir[..i]).unwrap_or_default();
            format!("{}{}", root, rest)
        }))
    }

    /// 查询第一行的某列；游标由 CursorGuard 在所有路径上关闭
    fn query_column(
        &self,
        uri: &str,
        column: &str,
        selection: Option<&str>,
        selection_args: &[String],
    ) -> Option<String> {
        let cursor = match self.resolver.query(uri, &[column], selection, selection_args) {
            Ok(Some(cursor)) => cursor,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("ContentResolver 查询失败 uri={}: {}", uri, e);
                return None;
            }
        };

        let mut guard = CursorGuard::new(cursor);
        match guard.first_string(column) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("读取列 {} 失败 uri={}: {}", column, uri, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeEnvironment, FakeResolver};

    fn resolver_with(fake: FakeResolver, sdk_int: u32) -> (Arc<FakeResolver>, UriResolver) {
        let fake = Arc::new(fake);
        let resolver =
            UriResolver::new(fake.clone(), Arc::new(FakeEnvironment::default()), sdk_int);
        (fake, resolver)
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            classify(
                "content://com.android.externalstorage.documents/document/primary%3ADCIM%2Fa.jpg",
                30
            ),
            UriCategory::ExternalStorageDocument {
                document_id: "primary:DCIM/a.jpg".into()
            }
        );
        assert_eq!(
            classify("content://com.android.providers.downloads.documents/document/42", 30),
            UriCategory::DownloadsDocument
        );
        assert_eq!(
            classify("content://com.android.providers.media.documents/document/image%3A1000", 30),
            UriCategory::MediaStoreDocument {
                document_id: "image:1000".into()
            }
        );
        assert_eq!(
            classify(
                concat!(
                    "content://com.android.externalstorage.documents",
                    "/tree/primary%3ADCIM/document/primary%3ADCIM%2Fb.png"
                ),
                30
            ),
            UriCategory::ExternalStorageDocument {
                document_id: "primary:DCIM/b.png".into()
            }
        );
        assert_eq!(
            classify("content://com.google.android.apps.docs.storage/document/abc", 30),
            UriCategory::OtherDocument
        );
        assert_eq!(
            classify("content://media/external/images/media/7", 30),
            UriCategory::GenericContent
        );
        // KitKat 之前没有文档 URI
        assert_eq!(
            classify("content://com.android.providers.media.documents/document/image%3A1000", 18),
            UriCategory::GenericContent
        );
        assert_eq!(classify("https://example.com/a.jpg", 30), UriCategory::Unresolvable);
        assert_eq!(classify("not a uri", 30), UriCategory::Unresolvable);
    }

    #[test]
    fn test_file_scheme_returns_path_unchanged() {
        let (fake, resolver) = resolver_with(FakeResolver::default(), 30);
        assert_eq!(
            resolver.resolve("file:///storage/emulated/0/DCIM/a.jpg").unwrap().as_deref(),
            Some("/storage/emulated/0/DCIM/a.jpg")
        );
        assert!(fake.queries.lock().unwrap().is_empty());
    }

    #[test]
    fn test_file_path_keeps_dot_segments() {
        let raw = |path: &str| UriCategory::RawFile { path: path.into() };
        assert_eq!(classify("file:///sdcard/DCIM/../x.jpg", 30), raw("/sdcard/DCIM/../x.jpg"));
        assert_eq!(classify("file:///sdcard/./a.jpg", 30), raw("/sdcard/./a.jpg"));
        assert_eq!(classify("file:///sdcard/a%20b.jpg?x=1#top", 30), raw("/sdcard/a b.jpg"));
        assert_eq!(classify("file:/sdcard/a.jpg", 30), raw("/sdcard/a.jpg"));
        assert_eq!(classify("file://localhost/sdcard/a.jpg", 30), raw("/sdcard/a.jpg"));
        // opaque 形式没有路径
        assert_eq!(classify("file:sdcard/a.jpg", 30), UriCategory::Unresolvable);
        assert_eq!(classify("file://localhost", 30), UriCategory::Unresolvable);
    }

    #[test]
    fn test_unresolvable_scheme_is_absent() {
        let (_, resolver) = resolver_with(FakeResolver::default(), 30);
        assert_eq!(resolver.resolve("https://example.com/a.jpg").unwrap(), None);
        assert_eq!(
            resolver
                .resolve("content://com.google.android.apps.docs.storage/document/abc")
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_primary_external_storage() {
        let (fake, resolver) = resolver_with(FakeResolver::default(), 30);
        let uri = "content://com.android.externalstorage.documents/document/PRIMARY%3ADCIM%2Fa.jpg";
        let path = resolver.resolve(uri).unwrap();
        assert_eq!(path.as_deref(), Some("/storage/emulated/0/DCIM/a.jpg"));
        assert!(fake.persisted.lock().unwrap().is_empty());
    }

    #[test]
    fn test_secondary_external_storage_takes_permission() {
        let uri = concat!(
            "content://com.android.externalstorage.documents",
            "/document/1A2B-3C4D%3APictures%2Fb.jpg"
        );
        let (fake, resolver) = resolver_with(FakeResolver::default(), 30);
        let path = resolver.resolve(uri).unwrap();
        assert_eq!(path.as_deref(), Some("/storage/1A2B-3C4D/Pictures/b.jpg"));
        assert_eq!(
            fake.persisted.lock().unwrap().as_slice(),
            &[(uri.to_string(), FLAG_GRANT_READ_URI_PERMISSION | FLAG_GRANT_WRITE_URI_PERMISSION)]
        );

        // API 23 及以下不处理次级存储
        let (_, old) = resolver_with(FakeResolver::default(), 23);
        assert_eq!(old.resolve(uri).unwrap(), None);
    }

    #[test]
    fn test_secondary_external_storage_permission_error_propagates() {
        let uri = "content://com.android.externalstorage.documents/document/1A2B-3C4D%3Ab.jpg";
        let (_, resolver) = resolver_with(FakeResolver::default().failing_persist(), 30);
        assert!(resolver.resolve(uri).is_err());
    }

    #[test]
    fn test_downloads_document() {
        let uri = "content://com.android.providers.downloads.documents/document/42";
        let (fake, resolver) = resolver_with(
            FakeResolver::default().with_row(uri, COLUMN_DISPLAY_NAME, "report.mp4"),
            30,
        );
        assert_eq!(
            resolver.resolve(uri).unwrap().as_deref(),
            Some("/storage/emulated/0/Download/report.mp4")
        );
        assert_eq!(fake.open_cursors(), 0);
    }

    #[test]
    fn test_media_document_queries_media_store() {
        let uri = "content://com.android.providers.media.documents/document/video%3A77";
        let (fake, resolver) = resolver_with(
            FakeResolver::default().with_row(
                VIDEO_EXTERNAL_CONTENT_URI,
                COLUMN_DATA,
                "/sdcard/Movies/c.mp4",
            ),
            30,
        );
        assert_eq!(resolver.resolve(uri).unwrap().as_deref(), Some("/sdcard/Movies/c.mp4"));

        let queries = fake.queries.lock().unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].uri, VIDEO_EXTERNAL_CONTENT_URI);
        assert_eq!(queries[0].projection, vec![COLUMN_DATA.to_string()]);
        assert_eq!(queries[0].selection.as_deref(), Some("_id=?"));
        assert_eq!(queries[0].selection_args, vec!["77".to_string()]);
        assert_eq!(fake.open_cursors(), 0);
    }

    #[test]
    fn test_media_document_unknown_type() {
        let (fake, resolver) = resolver_with(FakeResolver::default(), 30);
        let uri = "content://com.android.providers.media.documents/document/document%3A5";
        assert_eq!(resolver.resolve(uri).unwrap(), None);
        assert!(fake.queries.lock().unwrap().is_empty());
    }

    #[test]
    fn test_generic_content_data_column() {
        let uri = "content://media/external/images/media/7";
        let (_, resolver) = resolver_with(
            FakeResolver::default().with_row(uri, COLUMN_DATA, "/sdcard/DCIM/7.jpg"),
            30,
        );
        assert_eq!(resolver.resolve(uri).unwrap().as_deref(), Some("/sdcard/DCIM/7.jpg"));
    }

    #[test]
    fn test_cursor_closed_on_empty_and_error_paths() {
        let empty = "content://media/external/images/media/1";
        let wrong_column = "content://com.android.providers.downloads.documents/document/9";
        let failing = "content://media/external/images/media/3";
        let (fake, resolver) = resolver_with(
            FakeResolver::default()
                .with_empty(empty, COLUMN_DATA)
                // 下载文档查的是 _display_name，这里只有 _data 列
                .with_row(wrong_column, COLUMN_DATA, "/x")
                .with_failure(failing, "SQLiteException"),
            30,
        );

        assert_eq!(resolver.resolve(empty).unwrap(), None);
        assert_eq!(resolver.resolve(wrong_column).unwrap(), None);
        // 查询异常被吞掉，结果为空
        assert_eq!(resolver.resolve(failing).unwrap(), None);

        assert_eq!(fake.opened.load(std::sync::atomic::Ordering::SeqCst), 2);
        assert_eq!(fake.open_cursors(), 0);
    }
}
