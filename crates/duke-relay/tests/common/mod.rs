//! In-memory stores for workflow tests

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::path::Path;

use duke_relay::{
    CellValue, FileStore, RemoteFile, SheetMetadata, SheetRange, StoreError, StoreResult,
    TableRows, TableStore, UpdateSummary, UploadOptions, ValueInputMode,
};
use duke_relay_core::store::require_local_file;
use duke_relay_core::{CellRef, FOLDER_MIME_TYPE};
use serde_json::Value;

struct StoredFile {
    meta: RemoteFile,
    content: Vec<u8>,
}

/// File store keeping contents in memory, in insertion order
#[derive(Default)]
pub struct MemoryFileStore {
    files: RefCell<Vec<StoredFile>>,
    next_id: Cell<u32>,
    pub fail_uploads: Cell<bool>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> String {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        format!("file-{id}")
    }

    /// Add a file directly and return its ID
    pub fn insert(&self, name: &str, folder_id: Option<&str>, content: &[u8]) -> String {
        let id = self.next_id();
        self.files.borrow_mut().push(StoredFile {
            meta: RemoteFile {
                id: id.clone(),
                name: name.to_string(),
                mime_type: "text/plain".to_string(),
                size: Some(content.len() as u64),
                modified_time: None,
                parents: folder_id.map(str::to_string).into_iter().collect(),
            },
            content: content.to_vec(),
        });
        id
    }

    pub fn content(&self, file_id: &str) -> Option<Vec<u8>> {
        self.files
            .borrow()
            .iter()
            .find(|file| file.meta.id == file_id)
            .map(|file| file.content.clone())
    }

    pub fn metadata(&self, file_id: &str) -> Option<RemoteFile> {
        self.files
            .borrow()
            .iter()
            .find(|file| file.meta.id == file_id)
            .map(|file| file.meta.clone())
    }

    pub fn len(&self) -> usize {
        self.files.borrow().len()
    }

    fn not_found(file_id: &str) -> StoreError {
        StoreError::NotFound(format!("File not found: {file_id}"))
    }
}

impl FileStore for MemoryFileStore {
    // Queries are not interpreted; only the folder predicate filters
    fn list(&self, folder_id: Option<&str>, _query: Option<&str>) -> StoreResult<Vec<RemoteFile>> {
        Ok(self
            .files
            .borrow()
            .iter()
            .filter(|file| folder_id.map_or(true, |folder| file.meta.parents.iter().any(|p| p == folder)))
            .map(|file| file.meta.clone())
            .collect())
    }

    fn find_by_name(&self, name: &str, folder_id: Option<&str>) -> StoreResult<Option<RemoteFile>> {
        Ok(self
            .list(folder_id, None)?
            .into_iter()
            .find(|file| file.name == name))
    }

    fn download(&self, file_id: &str, output: &Path) -> StoreResult<u64> {
        let content = self.content(file_id).ok_or_else(|| Self::not_found(file_id))?;
        std::fs::write(output, &content)?;
        Ok(content.len() as u64)
    }

    fn upload(&self, local_path: &Path, options: &UploadOptions) -> StoreResult<String> {
        require_local_file(local_path)?;
        if self.fail_uploads.get() {
            return Err(StoreError::remote(500, "upload rejected"));
        }

        let content = std::fs::read(local_path)?;
        let name = options.name.clone().unwrap_or_else(|| {
            local_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default()
        });

        let id = self.insert(&name, options.folder_id.as_deref(), &content);
        if let Some(mime_type) = &options.mime_type {
            if let Some(file) = self.files.borrow_mut().iter_mut().find(|f| f.meta.id == id) {
                file.meta.mime_type = mime_type.clone();
            }
        }
        Ok(id)
    }

    fn update(&self, file_id: &str, local_path: &Path, _mime_type: Option<&str>) -> StoreResult<()> {
        require_local_file(local_path)?;
        let content = std::fs::read(local_path)?;

        let mut files = self.files.borrow_mut();
        let file = files
            .iter_mut()
            .find(|file| file.meta.id == file_id)
            .ok_or_else(|| Self::not_found(file_id))?;
        file.meta.size = Some(content.len() as u64);
        file.content = content;
        Ok(())
    }

    fn delete(&self, file_id: &str) -> StoreResult<()> {
        let mut files = self.files.borrow_mut();
        let before = files.len();
        files.retain(|file| file.meta.id != file_id);
        if files.len() == before {
            return Err(Self::not_found(file_id));
        }
        Ok(())
    }

    fn create_folder(&self, name: &str, parent_folder_id: Option<&str>) -> StoreResult<String> {
        let id = self.insert(name, parent_folder_id, &[]);
        if let Some(file) = self.files.borrow_mut().iter_mut().find(|f| f.meta.id == id) {
            file.meta.mime_type = FOLDER_MIME_TYPE.to_string();
            file.meta.size = None;
        }
        Ok(id)
    }
}

struct StoredSheet {
    meta: SheetMetadata,
    grid: TableRows,
}

/// Table store backed by in-memory grids
///
/// Reads trim trailing empty cells and rows the way the remote does.
pub struct MemoryTableStore {
    sheets: RefCell<Vec<StoredSheet>>,
    next_sheet_id: Cell<i64>,
    pub fail_writes: Cell<bool>,
    pub fail_metadata: Cell<bool>,
    pub last_mode: Cell<Option<ValueInputMode>>,
}

impl Default for MemoryTableStore {
    fn default() -> Self {
        Self::with_sheets(&["Sheet1"])
    }
}

impl MemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheets(titles: &[&str]) -> Self {
        let sheets = titles
            .iter()
            .enumerate()
            .map(|(index, title)| StoredSheet {
                meta: SheetMetadata {
                    sheet_id: index as i64,
                    title: title.to_string(),
                    index: index as u32,
                },
                grid: Vec::new(),
            })
            .collect();

        Self {
            sheets: RefCell::new(sheets),
            next_sheet_id: Cell::new(titles.len() as i64),
            fail_writes: Cell::new(false),
            fail_metadata: Cell::new(false),
            last_mode: Cell::new(None),
        }
    }

    /// Raw grid of a sheet
    pub fn grid(&self, title: &str) -> TableRows {
        self.sheets
            .borrow()
            .iter()
            .find(|sheet| sheet.meta.title == title)
            .map(|sheet| sheet.grid.clone())
            .unwrap_or_default()
    }

    /// Sheet index and area bounds `(first_row, first_col, last_row, last_col)`
    fn locate(&self, range: &str) -> StoreResult<(usize, u32, u32, Option<u32>, Option<u32>)> {
        let parsed = SheetRange::parse(range)?;
        let sheets = self.sheets.borrow();

        let index = match &parsed.sheet {
            Some(title) => sheets.iter().position(|sheet| &sheet.meta.title == title),
            None => (!sheets.is_empty()).then_some(0),
        }
        .ok_or_else(|| StoreError::remote(400, format!("Unable to parse range: {range}")))?;

        Ok(match parsed.area {
            Some(area) => {
                let ends = [area.start, area.end.unwrap_or(area.start)];
                let first = |pick: fn(&CellRef) -> Option<u32>| {
                    ends.iter().filter_map(pick).min().unwrap_or(0)
                };
                // Open when either end leaves the axis unbounded
                let last = |pick: fn(&CellRef) -> Option<u32>| {
                    ends.iter().map(pick).collect::<Option<Vec<u32>>>()?.into_iter().max()
                };
                (
                    index,
                    first(|end| end.row),
                    first(|end| end.col),
                    last(|end| end.row),
                    last(|end| end.col),
                )
            }
            None => (index, 0, 0, None, None),
        })
    }

    fn put_rows(&self, index: usize, row: u32, col: u32, rows: &TableRows) {
        let mut sheets = self.sheets.borrow_mut();
        let grid = &mut sheets[index].grid;

        for (r, values) in rows.iter().enumerate() {
            let target_row = row as usize + r;
            if grid.len() <= target_row {
                grid.resize(target_row + 1, Vec::new());
            }
            let cells = &mut grid[target_row];
            for (c, value) in values.iter().enumerate() {
                let target_col = col as usize + c;
                if cells.len() <= target_col {
                    cells.resize(target_col + 1, CellValue::Empty);
                }
                cells[target_col] = value.clone();
            }
        }
    }

    fn summary(range: String, rows: &TableRows) -> UpdateSummary {
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0) as u32;
        UpdateSummary {
            updated_range: Some(range),
            updated_rows: rows.len() as u32,
            updated_columns: columns,
            updated_cells: rows.iter().map(Vec::len).sum::<usize>() as u32,
        }
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.fail_writes.get() {
            Err(StoreError::remote(403, "The caller does not have permission"))
        } else {
            Ok(())
        }
    }
}

fn trim_row(mut row: Vec<CellValue>) -> Vec<CellValue> {
    while row.last().is_some_and(CellValue::is_empty) {
        row.pop();
    }
    row
}

impl TableStore for MemoryTableStore {
    fn read_range(&self, _spreadsheet_id: &str, range: &str) -> StoreResult<TableRows> {
        let (index, first_row, first_col, last_row, last_col) = self.locate(range)?;
        let sheets = self.sheets.borrow();
        let grid = &sheets[index].grid;

        let mut rows: TableRows = grid
            .iter()
            .enumerate()
            .skip(first_row as usize)
            .take_while(|(r, _)| last_row.map_or(true, |last| *r as u32 <= last))
            .map(|(_, cells)| {
                let slice: Vec<CellValue> = cells
                    .iter()
                    .enumerate()
                    .skip(first_col as usize)
                    .take_while(|(c, _)| last_col.map_or(true, |last| *c as u32 <= last))
                    // Blank cells inside a row come back as empty strings
                    .map(|(_, cell)| match cell {
                        CellValue::Empty => CellValue::from(""),
                        other => other.clone(),
                    })
                    .collect();
                trim_row(slice)
            })
            .collect();

        while rows.last().is_some_and(Vec::is_empty) {
            rows.pop();
        }
        Ok(rows)
    }

    fn write_range(
        &self,
        _spreadsheet_id: &str,
        range: &str,
        rows: &TableRows,
        mode: ValueInputMode,
    ) -> StoreResult<UpdateSummary> {
        self.check_writable()?;
        let (index, row, col, _, _) = self.locate(range)?;
        self.put_rows(index, row, col, rows);
        self.last_mode.set(Some(mode));
        Ok(Self::summary(range.to_string(), rows))
    }

    fn append_rows(
        &self,
        _spreadsheet_id: &str,
        range: &str,
        rows: &TableRows,
        mode: ValueInputMode,
    ) -> StoreResult<UpdateSummary> {
        self.check_writable()?;
        let (index, _, col, _, _) = self.locate(range)?;

        let next_row = {
            let sheets = self.sheets.borrow();
            sheets[index]
                .grid
                .iter()
                .rposition(|cells| cells.iter().any(|cell| !cell.is_empty()))
                .map_or(0, |last| last + 1)
        };

        self.put_rows(index, next_row as u32, col, rows);
        self.last_mode.set(Some(mode));
        Ok(Self::summary(range.to_string(), rows))
    }

    fn clear_range(&self, _spreadsheet_id: &str, range: &str) -> StoreResult<()> {
        self.check_writable()?;
        let (index, first_row, first_col, last_row, last_col) = self.locate(range)?;
        let mut sheets = self.sheets.borrow_mut();

        for (r, cells) in sheets[index].grid.iter_mut().enumerate() {
            let r = r as u32;
            if r < first_row || last_row.is_some_and(|last| r > last) {
                continue;
            }
            for (c, cell) in cells.iter_mut().enumerate() {
                let c = c as u32;
                if c >= first_col && last_col.map_or(true, |last| c <= last) {
                    *cell = CellValue::Empty;
                }
            }
        }
        Ok(())
    }

    fn sheet_metadata(&self, _spreadsheet_id: &str) -> StoreResult<Vec<SheetMetadata>> {
        if self.fail_metadata.get() {
            return Err(StoreError::Transport("connection reset".into()));
        }
        Ok(self
            .sheets
            .borrow()
            .iter()
            .map(|sheet| sheet.meta.clone())
            .collect())
    }

    fn create_sheet(&self, _spreadsheet_id: &str, title: &str) -> StoreResult<SheetMetadata> {
        let mut sheets = self.sheets.borrow_mut();
        if sheets.iter().any(|sheet| sheet.meta.title == title) {
            return Err(StoreError::remote(
                400,
                format!("A sheet with the name \"{title}\" already exists."),
            ));
        }

        let sheet_id = self.next_sheet_id.get();
        self.next_sheet_id.set(sheet_id + 1);
        let meta = SheetMetadata {
            sheet_id,
            title: title.to_string(),
            index: sheets.len() as u32,
        };
        sheets.push(StoredSheet {
            meta: meta.clone(),
            grid: Vec::new(),
        });
        Ok(meta)
    }

    fn delete_sheet(&self, _spreadsheet_id: &str, sheet_id: i64) -> StoreResult<()> {
        let mut sheets = self.sheets.borrow_mut();
        let position = sheets
            .iter()
            .position(|sheet| sheet.meta.sheet_id == sheet_id)
            .ok_or_else(|| StoreError::remote(400, format!("No sheet with id: {sheet_id}")))?;
        sheets.remove(position);
        for (index, sheet) in sheets.iter_mut().enumerate() {
            sheet.meta.index = index as u32;
        }
        Ok(())
    }

    fn batch_update(&self, _spreadsheet_id: &str, requests: &[Value]) -> StoreResult<Vec<Value>> {
        Ok(requests.iter().map(|_| Value::Object(Default::default())).collect())
    }
}
