// Dashboard controller - preset selection and the view/edit state machine
use crate::application::layout_engine::{derive_breakpoints, BreakpointLayouts};
use crate::application::preset_catalog::PresetCatalog;
use crate::application::preset_repository::{NewPreset, PresetRepository, PresetUpdate};
use crate::domain::errors::{DashboardError, DashboardResult};
use crate::domain::layout::{ComponentType, Dimension, DimensionLocks, Layout, LockedDimensions, Widget};
use crate::domain::preset::{Preset, PresetId, PresetSummary, DEFAULT_PRESET};
use serde::Deserialize;
use std::sync::Arc;

const GRID_COLUMNS: u32 = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: String,
    pub can_edit: bool,
}

/// Whether saving while a custom preset is active overwrites it silently or
/// only when the caller confirmed the update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdatePolicy {
    #[default]
    Confirm,
    Always,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    View,
    Edit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Exited,
    /// The layout changed; call `resolve_exit` with the user's choice.
    ConfirmationRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitChoice {
    Discard,
    KeepEditing,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PresetLoad {
    Loaded,
    /// The requested preset could not be loaded; the default is shown instead.
    FellBack(DashboardError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Transient user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub name: String,
    pub description: String,
    /// Caller confirmed overwriting the active custom preset.
    pub update_existing: bool,
}

/// Geometry reported by the grid after a drag or resize. Fields are
/// optional because the grid may hand back partial items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LayoutChange {
    pub i: String,
    pub x: Option<i64>,
    pub y: Option<i64>,
    pub w: Option<i64>,
    pub h: Option<i64>,
}

impl LayoutChange {
    fn geometry(&self) -> Option<(u32, u32, u32, u32)> {
        let (x, y, w, h) = (self.x?, self.y?, self.w?, self.h?);
        if w <= 0 || h <= 0 || x < 0 || y < 0 {
            return None;
        }
        Some((
            u32::try_from(x).ok()?,
            u32::try_from(y).ok()?,
            u32::try_from(w).ok()?,
            u32::try_from(h).ok()?,
        ))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WidgetTemplate {
    pub component_type: ComponentType,
    pub w: u32,
    pub h: u32,
    pub min_w: Option<u32>,
    pub min_h: Option<u32>,
    pub props: serde_json::Map<String, serde_json::Value>,
}

/// State captured on entering edit mode, restored by a discard.
#[derive(Debug, Clone)]
struct EditSnapshot {
    layout: Layout,
    active: PresetId,
    locks: LockedDimensions,
}

pub struct DashboardController {
    catalog: Arc<PresetCatalog>,
    presets: Arc<dyn PresetRepository>,
    user: UserContext,
    update_policy: UpdatePolicy,
    mode: Mode,
    active: PresetId,
    /// Built-in the current arrangement derives from
    base_preset: String,
    layout: Layout,
    pre_edit: Option<EditSnapshot>,
    locks: LockedDimensions,
    notices: Vec<Notice>,
}

impl DashboardController {
    pub fn new(
        catalog: Arc<PresetCatalog>,
        presets: Arc<dyn PresetRepository>,
        user: UserContext,
        update_policy: UpdatePolicy,
    ) -> Self {
        let layout = catalog.default_layout().clone();
        Self {
            catalog,
            presets,
            user,
            update_policy,
            mode: Mode::View,
            active: PresetId::default_preset(),
            base_preset: DEFAULT_PRESET.to_string(),
            layout,
            pre_edit: None,
            locks: LockedDimensions::new(),
            notices: Vec::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn active_preset(&self) -> &PresetId {
        &self.active
    }

    pub fn base_preset(&self) -> &str {
        &self.base_preset
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn locks(&self) -> &LockedDimensions {
        &self.locks
    }

    pub fn breakpoints(&self) -> BreakpointLayouts {
        derive_breakpoints(&self.layout, &self.locks)
    }

    /// True while editing with changes not in the pre-edit snapshot.
    pub fn is_dirty(&self) -> bool {
        match &self.pre_edit {
            Some(snapshot) => !snapshot.layout.structurally_eq(&self.layout),
            None => false,
        }
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notify(&mut self, level: NoticeLevel, message: String) {
        self.notices.push(Notice { level, message });
    }

    fn fail(&mut self, err: DashboardError) -> DashboardError {
        self.notify(NoticeLevel::Error, err.user_message());
        err
    }

    /// Built-in presets followed by the user's saved presets. A failed
    /// listing only drops the custom part.
    pub async fn list_presets(&mut self) -> Vec<PresetSummary> {
        let mut presets = self.catalog.list_presets();
        match self.presets.list_user_presets(&self.user.user_id).await {
            Ok(custom) => presets.extend(custom),
            Err(e) => {
                tracing::warn!("Failed to list presets for {}: {}", self.user.user_id, e);
                self.notify(NoticeLevel::Warning, e.user_message());
            }
        }
        presets
    }

    /// Switch the active preset. Leaves edit mode without prompting and
    /// drops any unsaved changes.
    pub async fn select_preset(&mut self, raw_id: &str) -> PresetLoad {
        if self.mode == Mode::Edit {
            tracing::debug!("Leaving edit mode to switch preset to {}", raw_id);
        }
        self.mode = Mode::View;
        self.pre_edit = None;
        self.locks.clear();

        match PresetId::parse(raw_id) {
            PresetId::BuiltIn(key) => {
                let key = if self.catalog.contains(&key) {
                    key
                } else {
                    DEFAULT_PRESET.to_string()
                };
                self.layout = self.catalog.get_preset(&key).clone();
                self.base_preset = key.clone();
                self.active = PresetId::BuiltIn(key);
                PresetLoad::Loaded
            }
            PresetId::Custom(id) => match self.fetch_valid_preset(&id).await {
                Ok(preset) => {
                    tracing::info!("Loaded custom preset {} ({})", preset.id, preset.name);
                    self.base_preset = preset
                        .base_preset
                        .clone()
                        .unwrap_or_else(|| DEFAULT_PRESET.to_string());
                    self.active = preset.preset_id();
                    self.layout = preset.layout;
                    PresetLoad::Loaded
                }
                Err(e) => {
                    tracing::warn!("Failed to load preset custom-{}: {}", id, e);
                    self.fall_back_to_default(e)
                }
            },
            PresetId::Unsaved => {
                self.fall_back_to_default(DashboardError::NotFound(raw_id.to_string()))
            }
        }
    }

    async fn fetch_valid_preset(&self, id: &str) -> DashboardResult<Preset> {
        let preset = self.presets.fetch_preset(id).await?;
        preset.layout.validate()?;
        Ok(preset)
    }

    fn fall_back_to_default(&mut self, err: DashboardError) -> PresetLoad {
        self.notify(NoticeLevel::Warning, err.user_message());
        self.active = PresetId::default_preset();
        self.base_preset = DEFAULT_PRESET.to_string();
        self.layout = self.catalog.default_layout().clone();
        PresetLoad::FellBack(err)
    }

    pub fn enter_edit(&mut self) -> DashboardResult<()> {
        if !self.user.can_edit {
            let err = DashboardError::PermissionDenied(format!(
                "user {} cannot edit dashboards",
                self.user.user_id
            ));
            self.notify(NoticeLevel::Info, err.user_message());
            return Err(err);
        }
        if self.mode == Mode::Edit {
            return Ok(());
        }
        self.pre_edit = Some(EditSnapshot {
            layout: self.layout.clone(),
            active: self.active.clone(),
            locks: self.locks.clone(),
        });
        self.mode = Mode::Edit;
        Ok(())
    }

    pub fn request_exit(&mut self) -> ExitOutcome {
        if self.mode == Mode::View {
            return ExitOutcome::Exited;
        }
        if self.is_dirty() {
            return ExitOutcome::ConfirmationRequired;
        }
        // Unchanged layout: report the preset it was loaded as.
        if let Some(snapshot) = self.pre_edit.take() {
            self.active = snapshot.active;
        }
        self.mode = Mode::View;
        ExitOutcome::Exited
    }

    pub fn resolve_exit(&mut self, choice: ExitChoice) {
        if self.mode != Mode::Edit {
            return;
        }
        match choice {
            ExitChoice::Discard => {
                if let Some(snapshot) = self.pre_edit.take() {
                    self.layout = snapshot.layout;
                    self.active = snapshot.active;
                    self.locks = snapshot.locks;
                }
                self.mode = Mode::View;
            }
            ExitChoice::KeepEditing => {}
        }
    }

    /// Persist the live layout, as an update of the active custom preset
    /// when the update policy allows it, otherwise as a new preset.
    pub async fn save(&mut self, request: SaveRequest) -> DashboardResult<Preset> {
        self.require_edit()?;
        if request.name.trim().is_empty() {
            let err = DashboardError::validation("name", "Preset name is required");
            return Err(self.fail(err));
        }

        let update_target = match self.update_policy {
            UpdatePolicy::Always => self.active.custom_id(),
            UpdatePolicy::Confirm if request.update_existing => self.active.custom_id(),
            UpdatePolicy::Confirm => None,
        }
        .map(str::to_string);

        let result = match update_target {
            Some(id) => {
                let update = PresetUpdate {
                    name: request.name,
                    description: request.description,
                    layout: self.layout.clone(),
                };
                self.presets.update_preset(&id, update).await
            }
            None => {
                let new_preset = NewPreset {
                    user_id: self.user.user_id.clone(),
                    name: request.name,
                    description: request.description,
                    layout: self.layout.clone(),
                    base_preset: self.base_preset.clone(),
                };
                self.presets.save_preset(new_preset).await
            }
        };

        match result {
            Ok(preset) => {
                tracing::info!("Saved preset custom-{} for {}", preset.id, self.user.user_id);
                self.active = preset.preset_id();
                self.pre_edit = None;
                self.mode = Mode::View;
                self.notify(NoticeLevel::Info, format!("Saved \"{}\"", preset.name));
                Ok(preset)
            }
            Err(e) => {
                tracing::warn!("Failed to save preset: {}", e);
                Err(self.fail(e))
            }
        }
    }

    fn require_edit(&self) -> DashboardResult<()> {
        match self.mode {
            Mode::Edit => Ok(()),
            Mode::View => Err(DashboardError::NotEditing),
        }
    }

    /// Merge grid geometry after a drag or resize. Items with missing
    /// geometry or a non-positive size are dropped, and a locked axis keeps
    /// its size. Returns how many widgets were updated.
    pub fn handle_layout_change(&mut self, changes: &[LayoutChange]) -> DashboardResult<usize> {
        self.require_edit()?;

        let valid: Vec<(&str, (u32, u32, u32, u32))> = changes
            .iter()
            .filter_map(|c| c.geometry().map(|g| (c.i.as_str(), g)))
            .collect();
        if valid.len() < changes.len() {
            tracing::debug!("Dropped {} invalid layout items", changes.len() - valid.len());
        }

        let mut applied = 0;
        for (id, (x, y, w, h)) in valid {
            if let Some(widget) = self.layout.0.iter_mut().find(|widget| widget.id == id) {
                let locked = self.locks.get(id);
                widget.x = x;
                widget.y = y;
                if !locked.width {
                    widget.w = w;
                }
                if !locked.height {
                    widget.h = h;
                }
                applied += 1;
            }
        }
        Ok(applied)
    }

    /// Append a widget below the current arrangement. Adding to a built-in
    /// preset moves the session onto an unsaved custom preset.
    pub fn add_widget(&mut self, template: WidgetTemplate) -> DashboardResult<String> {
        self.require_edit()?;

        let id = format!("{}-{}", template.component_type, uuid::Uuid::new_v4().simple());
        let widget = Widget {
            id: id.clone(),
            x: 0,
            y: self.layout.bottom(),
            w: template.w.clamp(1, GRID_COLUMNS),
            h: template.h.max(1),
            min_w: template.min_w,
            min_h: template.min_h,
            component_type: template.component_type,
            props: template.props,
        };
        self.layout.0.push(widget);

        if self.active.is_built_in() {
            tracing::debug!("Promoting built-in preset {} to an unsaved preset", self.active);
            self.active = PresetId::Unsaved;
        }
        Ok(id)
    }

    /// Remove a widget and its lock entry. Returns false for unknown ids.
    pub fn remove_widget(&mut self, widget_id: &str) -> DashboardResult<bool> {
        self.require_edit()?;
        let before = self.layout.len();
        self.layout.0.retain(|w| w.id != widget_id);
        self.locks.remove(widget_id);
        Ok(self.layout.len() < before)
    }

    pub fn toggle_lock(&mut self, widget_id: &str, dimension: Dimension) -> DashboardResult<DimensionLocks> {
        self.require_edit()?;
        if !self.layout.contains(widget_id) {
            return Err(DashboardError::NotFound(format!("widget {}", widget_id)));
        }
        Ok(self.locks.toggle(widget_id, dimension))
    }
}
