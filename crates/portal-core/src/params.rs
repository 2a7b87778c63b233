//! Live-editable scene parameters.
//!
//! `ParamStore` owns the current `SceneParams` and notifies subscribers
//! synchronously on every write. The panel on the web side writes through the
//! typed setters; the scene bindings subscribe and push values into uniforms.

use crate::color::Color;
use crate::error::ParamError;
use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamKey {
    SceneColor,
    PortalStrength,
    PortalColor,
    PoleStrength,
    PoleColor,
    PointSize,
    PortalDensity,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamValue {
    Scalar(f32),
    Color(Color),
}

impl ParamValue {
    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            ParamValue::Scalar(v) => Some(*v),
            ParamValue::Color(_) => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            ParamValue::Color(c) => Some(*c),
            ParamValue::Scalar(_) => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Folder {
    General,
    Portal,
    Pole,
}

impl Folder {
    pub fn title(&self) -> &'static str {
        match self {
            Folder::General => "General Tweaks",
            Folder::Portal => "Portal Tweaks",
            Folder::Pole => "Pole Tweaks",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamKind {
    Slider { min: f32, max: f32, step: f32 },
    Color,
}

/// One panel entry: which parameter, how it is labelled and edited.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamSpec {
    pub key: ParamKey,
    pub label: &'static str,
    pub folder: Folder,
    pub kind: ParamKind,
}

impl ParamSpec {
    /// Clamp to the declared range and snap to the step grid.
    pub fn constrain(&self, v: f32) -> f32 {
        match self.kind {
            ParamKind::Slider { min, max, step } => {
                let snapped = if step > 0.0 {
                    min + ((v - min) / step).round() * step
                } else {
                    v
                };
                snapped.clamp(min, max)
            }
            ParamKind::Color => v,
        }
    }
}

const PARAM_SPECS: [ParamSpec; 7] = [
    ParamSpec {
        key: ParamKey::PortalDensity,
        label: "PortalDensity",
        folder: Folder::Portal,
        kind: ParamKind::Slider {
            min: 0.0,
            max: 1.0,
            step: 0.0001,
        },
    },
    ParamSpec {
        key: ParamKey::PointSize,
        label: "pointSize",
        folder: Folder::Portal,
        kind: ParamKind::Slider {
            min: 0.0,
            max: 0.3,
            step: 0.001,
        },
    },
    ParamSpec {
        key: ParamKey::SceneColor,
        label: "sceneColor",
        folder: Folder::General,
        kind: ParamKind::Color,
    },
    ParamSpec {
        key: ParamKey::PortalStrength,
        label: "PortalStrength",
        folder: Folder::Portal,
        kind: ParamKind::Slider {
            min: 0.3,
            max: 1.0,
            step: 0.001,
        },
    },
    ParamSpec {
        key: ParamKey::PortalColor,
        label: "PortalColor",
        folder: Folder::Portal,
        kind: ParamKind::Color,
    },
    ParamSpec {
        key: ParamKey::PoleStrength,
        label: "PoleStrength",
        folder: Folder::Pole,
        kind: ParamKind::Slider {
            min: 0.3,
            max: 1.0,
            step: 0.001,
        },
    },
    ParamSpec {
        key: ParamKey::PoleColor,
        label: "BulbColor",
        folder: Folder::Pole,
        kind: ParamKind::Color,
    },
];

/// Panel entries in display order.
pub fn param_specs() -> &'static [ParamSpec] {
    &PARAM_SPECS
}

pub fn param_spec(key: ParamKey) -> &'static ParamSpec {
    // every key has exactly one entry in PARAM_SPECS
    match PARAM_SPECS.iter().find(|s| s.key == key) {
        Some(spec) => spec,
        None => unreachable!("no spec for {key:?}"),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneParams {
    pub scene_color: Color,
    pub portal_strength: f32,
    pub portal_color: Color,
    pub pole_strength: f32,
    pub pole_color: Color,
    // gradient endpoints carried with the scene but not exposed in the panel
    pub portal_color_start: Color,
    pub portal_color_end: Color,
    pub point_size: f32,
    pub portal_density: f32,
}

impl Default for SceneParams {
    fn default() -> Self {
        let hex = |s: &str| Color::from_hex(s).unwrap_or_default();
        Self {
            scene_color: hex("#ffffff"),
            portal_strength: 0.3,
            portal_color: hex("#04BCBD"),
            pole_strength: 0.3,
            pole_color: hex("#FFF200"),
            portal_color_start: hex("#007aff"),
            portal_color_end: hex("#0041ff"),
            point_size: 0.1,
            portal_density: 1.0,
        }
    }
}

impl SceneParams {
    pub fn get(&self, key: ParamKey) -> ParamValue {
        match key {
            ParamKey::SceneColor => ParamValue::Color(self.scene_color),
            ParamKey::PortalStrength => ParamValue::Scalar(self.portal_strength),
            ParamKey::PortalColor => ParamValue::Color(self.portal_color),
            ParamKey::PoleStrength => ParamValue::Scalar(self.pole_strength),
            ParamKey::PoleColor => ParamValue::Color(self.pole_color),
            ParamKey::PointSize => ParamValue::Scalar(self.point_size),
            ParamKey::PortalDensity => ParamValue::Scalar(self.portal_density),
        }
    }
}

/// A single applied edit, as delivered to subscribers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamChange {
    pub key: ParamKey,
    pub value: ParamValue,
}

type Listener = Box<dyn FnMut(&ParamChange, &SceneParams)>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: SmallVec<[(u64, Listener); 8]>,
    dispatching: bool,
    removed: SmallVec<[u64; 4]>,
}

/// Handle returned by [`ParamStore::subscribe`]. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut reg = registry.borrow_mut();
        if reg.dispatching {
            reg.removed.push(self.id);
        } else {
            reg.listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[derive(Default)]
pub struct ParamStore {
    params: SceneParams,
    registry: Rc<RefCell<Registry>>,
}

impl ParamStore {
    pub fn new(params: SceneParams) -> Self {
        Self {
            params,
            registry: Rc::default(),
        }
    }

    pub fn params(&self) -> &SceneParams {
        &self.params
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }

    /// Register a change handler. Handlers run synchronously, in subscription
    /// order, and must not write back into the store.
    pub fn subscribe(
        &self,
        listener: impl FnMut(&ParamChange, &SceneParams) + 'static,
    ) -> Subscription {
        let mut reg = self.registry.borrow_mut();
        let id = reg.next_id;
        reg.next_id += 1;
        reg.listeners.push((id, Box::new(listener)));
        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    pub fn set_scene_color(&mut self, color: Color) -> ParamChange {
        self.params.scene_color = color;
        self.emit(ParamKey::SceneColor)
    }

    pub fn set_portal_strength(&mut self, v: f32) -> ParamChange {
        self.params.portal_strength = param_spec(ParamKey::PortalStrength).constrain(v);
        self.emit(ParamKey::PortalStrength)
    }

    pub fn set_portal_color(&mut self, color: Color) -> ParamChange {
        self.params.portal_color = color;
        self.emit(ParamKey::PortalColor)
    }

    pub fn set_pole_strength(&mut self, v: f32) -> ParamChange {
        self.params.pole_strength = param_spec(ParamKey::PoleStrength).constrain(v);
        self.emit(ParamKey::PoleStrength)
    }

    pub fn set_pole_color(&mut self, color: Color) -> ParamChange {
        self.params.pole_color = color;
        self.emit(ParamKey::PoleColor)
    }

    pub fn set_point_size(&mut self, v: f32) -> ParamChange {
        self.params.point_size = param_spec(ParamKey::PointSize).constrain(v);
        self.emit(ParamKey::PointSize)
    }

    pub fn set_portal_density(&mut self, v: f32) -> ParamChange {
        self.params.portal_density = param_spec(ParamKey::PortalDensity).constrain(v);
        self.emit(ParamKey::PortalDensity)
    }

    /// Untyped entry point used by the panel.
    pub fn set(&mut self, key: ParamKey, value: ParamValue) -> Result<ParamChange, ParamError> {
        match (key, value) {
            (_, ParamValue::Scalar(v)) if !v.is_finite() => Err(ParamError::NotFinite(key)),
            (ParamKey::SceneColor, ParamValue::Color(c)) => Ok(self.set_scene_color(c)),
            (ParamKey::PortalColor, ParamValue::Color(c)) => Ok(self.set_portal_color(c)),
            (ParamKey::PoleColor, ParamValue::Color(c)) => Ok(self.set_pole_color(c)),
            (ParamKey::PortalStrength, ParamValue::Scalar(v)) => Ok(self.set_portal_strength(v)),
            (ParamKey::PoleStrength, ParamValue::Scalar(v)) => Ok(self.set_pole_strength(v)),
            (ParamKey::PointSize, ParamValue::Scalar(v)) => Ok(self.set_point_size(v)),
            (ParamKey::PortalDensity, ParamValue::Scalar(v)) => Ok(self.set_portal_density(v)),
            _ => Err(ParamError::KindMismatch(key)),
        }
    }

    fn emit(&mut self, key: ParamKey) -> ParamChange {
        let change = ParamChange {
            key,
            value: self.params.get(key),
        };
        log::debug!("[params] {:?} -> {:?}", key, change.value);

        // Listeners run with the registry released so a handler may drop its
        // own (or another) subscription.
        let mut active = {
            let mut reg = self.registry.borrow_mut();
            reg.dispatching = true;
            std::mem::take(&mut reg.listeners)
        };
        for (_, listener) in active.iter_mut() {
            listener(&change, &self.params);
        }
        let mut reg = self.registry.borrow_mut();
        reg.dispatching = false;
        let removed = std::mem::take(&mut reg.removed);
        let added = std::mem::take(&mut reg.listeners);
        active.extend(added);
        active.retain(|(id, _)| !removed.contains(id));
        reg.listeners = active;
        change
    }
}
