//! 测试用的宿主 / 权限代理 / ContentResolver 假实现

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::content::{ContentResolver, Cursor, StorageEnvironment};
use crate::error::{Error, Result};
use crate::host::{ActivityResult, IntentRequest, PickerHost, PlatformInfo, ResultData, RESULT_OK};
use crate::permission::{PermissionBroker, PermissionOutcome, PermissionRequest};
use crate::subscription::ActivityResultBus;

/// 单列多行的内存游标
pub struct FakeCursor {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
    position: Option<usize>,
    closed: Arc<AtomicUsize>,
}

impl Cursor for FakeCursor {
    fn move_to_first(&mut self) -> bool {
        if self.rows.is_empty() {
            false
        } else {
            self.position = Some(0);
            true
        }
    }

    fn column_index_or_throw(&self, column: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| Error::platform(format!("column '{}' does not exist", column)))
    }

    fn get_string(&self, column_index: usize) -> Option<String> {
        let row = self.rows.get(self.position?)?;
        row.get(column_index).cloned().flatten()
    }

    fn close(&mut self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// 记录的一次查询
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedQuery {
    pub uri: String,
    pub projection: Vec<String>,
    pub selection: Option<String>,
    pub selection_args: Vec<String>,
}

enum Table {
    Rows(Vec<String>, Vec<Vec<Option<String>>>),
    Fail(String),
}

#[derive(Default)]
pub struct FakeResolver {
    tables: Mutex<HashMap<String, Table>>,
    pub queries: Mutex<Vec<RecordedQuery>>,
    pub persisted: Mutex<Vec<(String, i32)>>,
    pub opened: AtomicUsize,
    pub closed: Arc<AtomicUsize>,
    pub fail_persist: bool,
}

impl FakeResolver {
    pub fn with_row(self, uri: &str, column: &str, value: &str) -> Self {
        self.tables.lock().unwrap().insert(
            uri.to_string(),
            Table::Rows(vec![column.to_string()], vec![vec![Some(value.to_string())]]),
        );
        self
    }

    pub fn with_empty(self, uri: &str, column: &str) -> Self {
        self.tables
            .lock()
            .unwrap()
            .insert(uri.to_string(), Table::Rows(vec![column.to_string()], Vec::new()));
        self
    }

    pub fn with_failure(self, uri: &str, message: &str) -> Self {
        self.tables
            .lock()
            .unwrap()
            .insert(uri.to_string(), Table::Fail(message.to_string()));
        self
    }

    pub fn failing_persist(mut self) -> Self {
        self.fail_persist = true;
        self
    }

    pub fn open_cursors(&self) -> usize {
        self.opened.load(Ordering::SeqCst) - self.closed.load(Ordering::SeqCst)
    }
}

impl ContentResolver for FakeResolver {
    fn query(
        &self,
        uri: &str,
        projection: &[&str],
        selection: Option<&str>,
        selection_args: &[String],
    ) -> Result<Option<Box<dyn Cursor>>> {
        self.queries.lock().unwrap().push(RecordedQuery {
            uri: uri.to_string(),
            projection: projection.iter().map(|s| s.to_string()).collect(),
            selection: selection.map(str::to_string),
            selection_args: selection_args.to_vec(),
        });
        let tables = self.tables.lock().unwrap();
        match tables.get(uri) {
            None => Ok(None),
            Some(Table::Fail(message)) => Err(Error::platform(message.clone())),
            Some(Table::Rows(columns, rows)) => {
                self.opened.fetch_add(1, Ordering::SeqCst);
                Ok(Some(Box::new(FakeCursor {
                    columns: columns.clone(),
                    rows: rows.clone(),
                    position: None,
                    closed: Arc::clone(&self.closed),
                })))
            }
        }
    }

    fn take_persistable_uri_permission(&self, uri: &str, mode_flags: i32) -> Result<()> {
        if self.fail_persist {
            return Err(Error::platform("SecurityException: no persistable permission grant"));
        }
        self.persisted
            .lock()
            .unwrap()
            .push((uri.to_string(), mode_flags));
        Ok(())
    }
}

pub struct FakeEnvironment {
    pub media_dirs: Vec<String>,
}

impl Default for FakeEnvironment {
    fn default() -> Self {
        Self {
            media_dirs: vec![
                "/storage/emulated/0/Android/media/app.test".to_string(),
                "/storage/1A2B-3C4D/Android/media/app.test".to_string(),
            ],
        }
    }
}

impl StorageEnvironment for FakeEnvironment {
    fn external_storage_directory(&self) -> String {
        "/storage/emulated/0".to_string()
    }

    fn downloads_directory(&self) -> String {
        "/storage/emulated/0/Download".to_string()
    }

    fn external_media_dirs(&self) -> Vec<String> {
        self.media_dirs.clone()
    }
}

/// 宿主在启动 Intent 后如何回应
#[derive(Clone)]
pub enum HostScript {
    /// 按顺序发布这些结果
    Respond(Vec<ActivityResult>),
    /// 启动即失败
    LaunchFails(String),
    /// 不发布任何结果
    Silent,
}

pub struct FakeHost {
    pub platform: PlatformInfo,
    pub bus: Arc<ActivityResultBus>,
    pub script: Mutex<HostScript>,
    pub launched: Mutex<Vec<(IntentRequest, i32)>>,
}

impl FakeHost {
    pub fn new(platform: PlatformInfo, script: HostScript) -> Self {
        Self {
            platform,
            bus: ActivityResultBus::new(),
            script: Mutex::new(script),
            launched: Mutex::new(Vec::new()),
        }
    }

    pub fn set_script(&self, script: HostScript) {
        *self.script.lock().unwrap() = script;
    }

    /// RESULT_OK，只带单个 data URI
    pub fn ok_with_data(request_code: i32, uri: &str) -> ActivityResult {
        ActivityResult {
            request_code,
            result_code: RESULT_OK,
            intent: Some(ResultData {
                data: Some(uri.to_string()),
                clip: None,
            }),
        }
    }

    pub fn ok_with_clip(request_code: i32, items: Vec<Option<&str>>) -> ActivityResult {
        ActivityResult {
            request_code,
            result_code: RESULT_OK,
            intent: Some(ResultData {
                data: None,
                clip: Some(items.into_iter().map(|i| i.map(str::to_string)).collect()),
            }),
        }
    }
}

#[async_trait]
impl PickerHost for FakeHost {
    fn platform(&self) -> PlatformInfo {
        self.platform
    }

    fn activity_results(&self) -> Arc<ActivityResultBus> {
        Arc::clone(&self.bus)
    }

    async fn start_activity_for_result(
        &self,
        intent: IntentRequest,
        request_code: i32,
    ) -> Result<()> {
        self.launched.lock().unwrap().push((intent, request_code));
        let script = self.script.lock().unwrap().clone();
        match script {
            HostScript::Respond(results) => {
                for result in results {
                    self.bus.publish(result);
                }
                Ok(())
            }
            HostScript::LaunchFails(message) => Err(Error::platform(message)),
            HostScript::Silent => Ok(()),
        }
    }
}

pub struct FakeBroker {
    pub grant: bool,
    pub calls: AtomicUsize,
}

impl FakeBroker {
    pub fn new(grant: bool) -> Self {
        Self {
            grant,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PermissionBroker for FakeBroker {
    async fn request_permissions(&self, request: &PermissionRequest) -> Result<PermissionOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let grants = request
            .entries
            .iter()
            .map(|e| (e.permission.clone(), self.grant))
            .collect();
        Ok(PermissionOutcome { grants })
    }
}
