//! Camera restriction aggregate

use serde::Serialize;
use uuid::Uuid;

use super::evaluator::PermissionEvaluator;
use crate::command::RlvCommand;

/// Most restrictive camera limits currently in force
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CameraRestrictions {
    /// Whether the camera may leave the avatar
    pub can_unlock: bool,
    /// Minimum camera-to-avatar distance
    pub av_dist_min: Option<f32>,
    /// Maximum camera-to-avatar distance
    pub av_dist_max: Option<f32>,
    /// Inner radius of the vision sphere
    pub draw_min: Option<f32>,
    /// Outer radius of the vision sphere
    pub draw_max: Option<f32>,
    /// Opacity at the inner radius
    pub draw_alpha_min: Option<f32>,
    /// Opacity at the outer radius
    pub draw_alpha_max: Option<f32>,
    /// Vision sphere color
    pub draw_color: Option<[f32; 3]>,
    /// Minimum zoom factor
    pub zoom_min: Option<f32>,
    /// Maximum zoom factor
    pub zoom_max: Option<f32>,
    /// Minimum field of view, radians
    pub fov_min: Option<f32>,
    /// Maximum field of view, radians
    pub fov_max: Option<f32>,
    /// Whether world textures are replaced
    pub textures_restricted: bool,
    /// Replacement texture, when one was named
    pub texture_id: Option<Uuid>,
}

impl CameraRestrictions {
    /// Whether any camera restriction is active
    pub fn is_restricted(&self) -> bool {
        *self != CameraRestrictions {
            can_unlock: true,
            ..Default::default()
        }
    }
}

impl PermissionEvaluator<'_> {
    /// Aggregate every camera restriction into one snapshot
    pub fn camera_restrictions(&self) -> CameraRestrictions {
        let extremum = |command| self.store.aggregate_extremum(command);
        let textures = self.store.query(RlvCommand::CamTextures);

        CameraRestrictions {
            can_unlock: !self.store.has(RlvCommand::CamUnlock),
            av_dist_min: extremum(RlvCommand::CamAvDistMin),
            av_dist_max: extremum(RlvCommand::CamAvDistMax),
            draw_min: extremum(RlvCommand::CamDrawMin),
            draw_max: extremum(RlvCommand::CamDrawMax),
            draw_alpha_min: extremum(RlvCommand::CamDrawAlphaMin),
            draw_alpha_max: extremum(RlvCommand::CamDrawAlphaMax),
            draw_color: self
                .store
                .latest_values(RlvCommand::CamDrawColor)
                .and_then(|v| <[f32; 3]>::try_from(v).ok()),
            zoom_min: extremum(RlvCommand::CamZoomMin),
            zoom_max: extremum(RlvCommand::CamZoomMax),
            fov_min: extremum(RlvCommand::CamFovMin),
            fov_max: extremum(RlvCommand::CamFovMax),
            textures_restricted: !textures.is_empty(),
            texture_id: textures
                .iter()
                .max_by_key(|r| r.sequence)
                .and_then(|r| r.param.as_deref())
                .and_then(|p| Uuid::parse_str(p).ok()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandParser;
    use crate::restrictions::{Restriction, RestrictionStore};

    fn add(store: &mut RestrictionStore, text: &str) {
        let cmd = CommandParser::new().unwrap().parse(text).unwrap();
        store.apply(Restriction::from_command(&cmd, Uuid::new_v4(), "obj").unwrap());
    }

    #[test]
    fn test_unrestricted_camera() {
        let store = RestrictionStore::new();
        let camera = PermissionEvaluator::new(&store).camera_restrictions();
        assert!(camera.can_unlock);
        assert!(!camera.is_restricted());
        assert_eq!(camera.zoom_min, None);
    }

    #[test]
    fn test_camera_aggregate() {
        let texture = Uuid::new_v4();
        let mut store = RestrictionStore::new();
        add(&mut store, "camdistmax:10=n");
        add(&mut store, "setcam_avdistmax:4=n");
        add(&mut store, "camzoommin:1.5=n");
        add(&mut store, "camzoommin:3=n");
        add(&mut store, "camdrawcolor:1;0;0=n");
        add(&mut store, "camunlock=n");
        add(&mut store, &format!("camtextures:{}=n", texture));

        let camera = PermissionEvaluator::new(&store).camera_restrictions();
        assert!(camera.is_restricted());
        assert!(!camera.can_unlock);
        assert_eq!(camera.av_dist_max, Some(4.0));
        assert_eq!(camera.zoom_min, Some(3.0));
        assert_eq!(camera.draw_color, Some([1.0, 0.0, 0.0]));
        assert!(camera.textures_restricted);
        assert_eq!(camera.texture_id, Some(texture));
    }
}
