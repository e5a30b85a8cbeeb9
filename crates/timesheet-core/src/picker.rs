use tokio::time::Instant;
use tracing::debug;

use crate::modal::{
  ModalLifecycle,
  ModalTimings,
  ModalTransition
};

/// Two-pane chooser: search results on the
/// left, the chosen items on the right.
#[derive(
  Debug, Clone, Default, PartialEq, Eq,
)]
pub struct DualListPicker {
  source:           Vec<String>,
  results:          Vec<String>,
  checked_results:  Vec<String>,
  selected:         Vec<String>,
  checked_selected: Vec<String>
}

impl DualListPicker {
  pub fn new(source: Vec<String>) -> Self {
    Self {
      results: source.clone(),
      source,
      ..Self::default()
    }
  }

  pub fn results(&self) -> &[String] {
    &self.results
  }

  pub fn selected(&self) -> &[String] {
    &self.selected
  }

  pub fn checked_results(
    &self
  ) -> &[String] {
    &self.checked_results
  }

  pub fn checked_selected(
    &self
  ) -> &[String] {
    &self.checked_selected
  }

  /// Narrows the results to items
  /// containing every non-empty term.
  pub fn search(
    &mut self,
    terms: &[&str]
  ) {
    let terms: Vec<&str> = terms
      .iter()
      .map(|t| t.trim())
      .filter(|t| !t.is_empty())
      .collect();
    self.results = self
      .source
      .iter()
      .filter(|item| {
        terms
          .iter()
          .all(|t| item.contains(t))
      })
      .cloned()
      .collect();
    self.checked_results.retain(|item| {
      self.results.contains(item)
    });
    debug!(
      terms = ?terms,
      count = self.results.len(),
      "picker search applied"
    );
  }

  pub fn toggle_result(
    &mut self,
    item: &str
  ) {
    toggle(
      &mut self.checked_results,
      item
    );
  }

  /// Appends checked results to the
  /// selection, skipping duplicates.
  pub fn move_checked(&mut self) {
    for item in
      self.checked_results.drain(..)
    {
      if !self.selected.contains(&item) {
        self.selected.push(item);
      }
    }
  }

  pub fn toggle_selected(
    &mut self,
    item: &str
  ) {
    toggle(
      &mut self.checked_selected,
      item
    );
  }

  pub fn remove_checked(&mut self) {
    let checked = std::mem::take(
      &mut self.checked_selected
    );
    self
      .selected
      .retain(|s| !checked.contains(s));
  }

  pub fn remove(&mut self, item: &str) {
    self.selected.retain(|s| s != item);
    self
      .checked_selected
      .retain(|s| s != item);
  }

  pub fn save(&self) -> Vec<String> {
    self.selected.clone()
  }
}

fn toggle(
  list: &mut Vec<String>,
  item: &str
) {
  if let Some(idx) =
    list.iter().position(|s| s == item)
  {
    list.remove(idx);
  } else {
    list.push(item.to_string());
  }
}

#[derive(Debug, Clone)]
pub struct FavoriteTasksDialog {
  pub modal:  ModalLifecycle,
  pub picker: DualListPicker,
  category:   Option<String>,
  task_name:  Option<String>
}

impl FavoriteTasksDialog {
  pub fn new(
    tasks: Vec<String>,
    timings: ModalTimings
  ) -> Self {
    Self {
      modal: ModalLifecycle::new(
        "favorite_tasks",
        timings
      ),
      picker: DualListPicker::new(tasks),
      category: None,
      task_name: None
    }
  }

  pub fn open(&mut self, now: Instant) {
    self.modal.set_open(true, now);
  }

  pub fn close(&mut self, now: Instant) {
    self.modal.set_open(false, now);
  }

  pub fn tick(
    &mut self,
    now: Instant
  ) -> Option<ModalTransition> {
    self.modal.advance(now)
  }

  pub fn category(
    &self
  ) -> Option<&str> {
    self.category.as_deref()
  }

  pub fn task_name(
    &self
  ) -> Option<&str> {
    self.task_name.as_deref()
  }

  pub fn set_category(
    &mut self,
    category: Option<String>
  ) {
    self.category = category;
  }

  pub fn clear_category(&mut self) {
    self.category = None;
  }

  pub fn set_task_name(
    &mut self,
    task_name: Option<String>
  ) {
    self.task_name = task_name;
  }

  pub fn clear_task_name(&mut self) {
    self.task_name = None;
  }

  /// Filters by category and task name;
  /// unset filters match everything.
  pub fn search(&mut self) {
    let category = self
      .category
      .clone()
      .unwrap_or_default();
    let task = self
      .task_name
      .clone()
      .unwrap_or_default();
    self.picker.search(&[
      category.as_str(),
      task.as_str()
    ]);
  }

  /// Closes the dialog and hands back the
  /// favorites.
  pub fn save(
    &mut self,
    now: Instant
  ) -> Vec<String> {
    self.close(now);
    self.picker.save()
  }
}

#[derive(Debug, Clone)]
pub struct UserListDialog {
  pub modal:       ModalLifecycle,
  pub picker:      DualListPicker,
  employee_number: String,
  user_name:       String
}

impl UserListDialog {
  pub fn new(
    users: Vec<String>,
    timings: ModalTimings
  ) -> Self {
    Self {
      modal: ModalLifecycle::new(
        "user_list",
        timings
      ),
      picker: DualListPicker::new(users),
      employee_number: String::new(),
      user_name: String::new()
    }
  }

  pub fn open(&mut self, now: Instant) {
    self.modal.set_open(true, now);
  }

  pub fn close(&mut self, now: Instant) {
    self.modal.set_open(false, now);
  }

  pub fn tick(
    &mut self,
    now: Instant
  ) -> Option<ModalTransition> {
    self.modal.advance(now)
  }

  pub fn set_employee_number(
    &mut self,
    value: &str
  ) {
    self.employee_number =
      value.to_string();
  }

  pub fn clear_employee_number(
    &mut self
  ) {
    self.employee_number.clear();
  }

  pub fn set_user_name(
    &mut self,
    value: &str
  ) {
    self.user_name = value.to_string();
  }

  pub fn clear_user_name(&mut self) {
    self.user_name.clear();
  }

  pub fn search(&mut self) {
    let number =
      self.employee_number.clone();
    let name = self.user_name.clone();
    self.picker.search(&[
      number.as_str(),
      name.as_str()
    ]);
  }

  pub fn save(
    &mut self,
    now: Instant
  ) -> Vec<String> {
    self.close(now);
    self.picker.save()
  }
}
