//! Puck templates: the canonical slot layout decoded symbols are assigned to.
//!
//! A template lives in its own normalized unit system; the aligner fits a
//! similarity transform from template space into image pixels per frame.

use std::fs;
use std::path::Path;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Puck description as found in configuration, in template units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PuckTemplateSpec {
    /// Radius of the puck disc.
    pub radius: f32,
    /// Radius of a single slot.
    pub slot_radius: f32,
    /// Nominal slot centers relative to the puck center, slot index order.
    pub slots: Vec<[f32; 2]>,
}

/// Template validation errors.
#[derive(thiserror::Error, Debug)]
pub enum PuckTemplateError {
    #[error("puck radius must be finite and > 0")]
    InvalidRadius,
    #[error("slot radius must be finite, > 0 and smaller than the puck radius")]
    InvalidSlotRadius,
    #[error("template needs at least 2 slots, got {0}")]
    TooFewSlots(usize),
    #[error("slot {0} does not fit inside the puck disc")]
    SlotOutsideDisc(usize),
}

/// Errors when loading a template from disk.
#[derive(thiserror::Error, Debug)]
pub enum PuckIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Template(#[from] PuckTemplateError),
}

/// Validated puck template.
#[derive(Clone, Debug)]
pub struct PuckTemplate {
    spec: PuckTemplateSpec,
    slots: Vec<Point2<f32>>,
}

impl PuckTemplate {
    /// Validate and create a template from a spec.
    pub fn new(spec: PuckTemplateSpec) -> Result<Self, PuckTemplateError> {
        if !spec.radius.is_finite() || spec.radius <= 0.0 {
            return Err(PuckTemplateError::InvalidRadius);
        }
        if !spec.slot_radius.is_finite() || spec.slot_radius <= 0.0 || spec.slot_radius >= spec.radius
        {
            return Err(PuckTemplateError::InvalidSlotRadius);
        }
        if spec.slots.len() < 2 {
            return Err(PuckTemplateError::TooFewSlots(spec.slots.len()));
        }
        let slots: Vec<Point2<f32>> = spec.slots.iter().map(|&[x, y]| Point2::new(x, y)).collect();
        for (i, slot) in slots.iter().enumerate() {
            let reach = slot.coords.norm() + spec.slot_radius;
            if !reach.is_finite() || reach > spec.radius {
                return Err(PuckTemplateError::SlotOutsideDisc(i));
            }
        }
        Ok(Self { spec, slots })
    }

    /// Load a template from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PuckIoError> {
        let text = fs::read_to_string(path)?;
        let spec: PuckTemplateSpec = serde_json::from_str(&text)?;
        Ok(Self::new(spec)?)
    }

    /// The builtin 16-slot Unipuck layout: five slots on an inner ring,
    /// eleven on an outer ring, both starting at twelve o'clock.
    pub fn unipuck() -> Self {
        let mut slots = Vec::with_capacity(16);
        for (count, ring) in [(5usize, 0.40f32), (11, 0.76)] {
            for i in 0..count {
                let angle = -std::f32::consts::FRAC_PI_2
                    + i as f32 * std::f32::consts::TAU / count as f32;
                slots.push([ring * angle.cos(), ring * angle.sin()]);
            }
        }
        let spec = PuckTemplateSpec {
            radius: 1.0,
            slot_radius: 0.175,
            slots,
        };
        Self::new(spec).expect("builtin unipuck layout is valid")
    }

    #[inline]
    pub fn spec(&self) -> &PuckTemplateSpec {
        &self.spec
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.spec.radius
    }

    #[inline]
    pub fn slot_radius(&self) -> f32 {
        self.spec.slot_radius
    }

    /// Nominal slot centers, slot index order.
    #[inline]
    pub fn slots(&self) -> &[Point2<f32>] {
        &self.slots
    }

    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unipuck_has_sixteen_slots_inside_the_disc() {
        let puck = PuckTemplate::unipuck();
        assert_eq!(puck.slot_count(), 16);
        for slot in puck.slots() {
            assert!(slot.coords.norm() + puck.slot_radius() <= puck.radius());
        }
    }

    #[test]
    fn rejects_bad_radii() {
        let spec = PuckTemplateSpec {
            radius: 0.0,
            slot_radius: 0.1,
            slots: vec![[0.0, 0.0], [0.5, 0.0]],
        };
        assert!(matches!(
            PuckTemplate::new(spec),
            Err(PuckTemplateError::InvalidRadius)
        ));

        let spec = PuckTemplateSpec {
            radius: 1.0,
            slot_radius: 1.5,
            slots: vec![[0.0, 0.0], [0.5, 0.0]],
        };
        assert!(matches!(
            PuckTemplate::new(spec),
            Err(PuckTemplateError::InvalidSlotRadius)
        ));
    }

    #[test]
    fn rejects_slot_leaving_the_disc() {
        let spec = PuckTemplateSpec {
            radius: 1.0,
            slot_radius: 0.2,
            slots: vec![[0.0, 0.0], [0.95, 0.0]],
        };
        assert!(matches!(
            PuckTemplate::new(spec),
            Err(PuckTemplateError::SlotOutsideDisc(1))
        ));
    }

    #[test]
    fn spec_round_trips_through_json() {
        let puck = PuckTemplate::unipuck();
        let text = serde_json::to_string(puck.spec()).unwrap();
        let back: PuckTemplateSpec = serde_json::from_str(&text).unwrap();
        let reloaded = PuckTemplate::new(back).unwrap();
        assert_eq!(reloaded.slot_count(), puck.slot_count());
    }
}
