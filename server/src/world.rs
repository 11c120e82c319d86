//! Level geometry loading for the host.
//!
//! Static colliders are validated and handed to the shared [`MoverWorld`] once at startup;
//! they never change afterwards. Lines are dynamic and are managed by the simulation.

use mover_shared::{ColliderShapeDef, KccSettings, LineDef, MoverWorld, Vec3, WorldStaticDef};

/// Everything needed to build a level.
#[derive(Clone, Debug, Default)]
pub struct LevelDef {
    pub statics: Vec<WorldStaticDef>,
    pub lines: Vec<LineDef>,
}

fn finite(v: &Vec3) -> bool {
    v.iter().all(|c| c.is_finite())
}

fn is_valid_static(def: &WorldStaticDef) -> bool {
    let shape_ok = match &def.shape {
        ColliderShapeDef::Plane {
            offset_along_normal,
        } => offset_along_normal.is_finite(),
        ColliderShapeDef::Cuboid { half_extents } => {
            finite(half_extents) && half_extents.iter().all(|c| *c > 0.0)
        }
        ColliderShapeDef::Sphere { radius } => radius.is_finite() && *radius > 0.0,
        ColliderShapeDef::CapsuleY {
            radius,
            half_height,
        } => radius.is_finite() && half_height.is_finite() && *radius > 0.0 && *half_height >= 0.0,
    };

    shape_ok && finite(&def.translation) && def.rotation.coords.iter().all(|c| c.is_finite())
}

pub fn is_valid_line(line: &LineDef) -> bool {
    finite(&line.a) && finite(&line.b) && line.radius.is_finite() && line.radius > 0.0
}

/// Build the query world from validated statics. Invalid rows are skipped with a warning.
pub fn build_world(statics: Vec<WorldStaticDef>, kcc: &KccSettings) -> MoverWorld {
    let total = statics.len();
    let valid: Vec<WorldStaticDef> = statics
        .into_iter()
        .filter(|def| {
            let ok = is_valid_static(def);
            if !ok {
                log::warn!("Skipping invalid world static {}", def.id);
            }
            ok
        })
        .collect();

    log::info!("Building world from {} of {} statics", valid.len(), total);
    MoverWorld::new(valid, kcc)
}
