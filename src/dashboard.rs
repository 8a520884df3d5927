//! Dashboard item interpretation.
//!
//! A raw `status` code is ambiguous: the same number means different things
//! for points and tasks, so it is always decoded together with `entry_type`.
//! Codes outside the known sets are carried through untouched.

use serde::Serialize;

use crate::domain::DashboardItem;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryType {
  Point,
  Task,
  Target,
}

impl EntryType {
  pub fn from_code(code: i32) -> Option<Self> {
    match code {
      1 => Some(EntryType::Point),
      2 => Some(EntryType::Task),
      3 => Some(EntryType::Target),
      _ => None,
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointStatus {
  NotStarted,
  InProgress,
  Done,
  OnHold,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskStatus {
  Open,
  Working,
  Resolved,
  Skipped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemStatus {
  Point(PointStatus),
  Task(TaskStatus),
  /// Targets have no enumerated status.
  Target(i32),
  Unknown { entry_type: i32, status: i32 },
}

impl ItemStatus {
  pub fn interpret(entry_type: i32, status: i32) -> Self {
    let unknown = ItemStatus::Unknown { entry_type, status };
    match EntryType::from_code(entry_type) {
      Some(EntryType::Point) => match status {
        1 => ItemStatus::Point(PointStatus::NotStarted),
        2 => ItemStatus::Point(PointStatus::InProgress),
        3 => ItemStatus::Point(PointStatus::Done),
        4 => ItemStatus::Point(PointStatus::OnHold),
        _ => unknown,
      },
      Some(EntryType::Task) => match status {
        1 => ItemStatus::Task(TaskStatus::Open),
        2 => ItemStatus::Task(TaskStatus::Working),
        3 => ItemStatus::Task(TaskStatus::Resolved),
        4 => ItemStatus::Task(TaskStatus::Skipped),
        _ => unknown,
      },
      Some(EntryType::Target) => ItemStatus::Target(status),
      None => unknown,
    }
  }

  pub fn label(&self) -> Option<&'static str> {
    match self {
      ItemStatus::Point(PointStatus::NotStarted) => Some("未着手"),
      ItemStatus::Point(PointStatus::InProgress) => Some("進行中"),
      ItemStatus::Point(PointStatus::Done) => Some("完了"),
      ItemStatus::Point(PointStatus::OnHold) => Some("保留"),
      ItemStatus::Task(TaskStatus::Open) => Some("未対応"),
      ItemStatus::Task(TaskStatus::Working) => Some("対応中"),
      ItemStatus::Task(TaskStatus::Resolved) => Some("対応済"),
      ItemStatus::Task(TaskStatus::Skipped) => Some("見送り"),
      ItemStatus::Target(_) | ItemStatus::Unknown { .. } => None,
    }
  }
}

impl DashboardItem {
  pub fn kind(&self) -> Option<EntryType> {
    EntryType::from_code(self.entry_type)
  }

  pub fn item_status(&self) -> ItemStatus {
    ItemStatus::interpret(self.entry_type, self.status)
  }

  pub fn is_deleted(&self) -> bool {
    self.deleted_at.is_some()
  }

  pub fn is_favorite(&self) -> bool {
    self.favorite == 1
  }
}

/// Item as shown in the active view: the backend row plus its decoded status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardItemView {
  #[serde(flatten)]
  pub item: DashboardItem,
  pub status_label: Option<&'static str>,
}

/// Drop soft-deleted rows and order the rest by `position`, then `id`.
pub fn active_view(items: Vec<DashboardItem>) -> Vec<DashboardItemView> {
  let mut active: Vec<DashboardItem> = items.into_iter().filter(|i| !i.is_deleted()).collect();
  active.sort_by_key(|i| (i.position, i.id));
  active
    .into_iter()
    .map(|item| {
      let status_label = item.item_status().label();
      DashboardItemView { item, status_label }
    })
    .collect()
}
