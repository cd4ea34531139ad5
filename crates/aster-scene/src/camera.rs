//! Camera systems for rendering.

use glam::{Mat4, Quat, Vec3};

/// Projection type for the camera.
#[derive(Clone, Debug)]
pub enum Projection {
    /// Perspective projection
    Perspective {
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
    /// Orthographic projection
    Orthographic {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    },
}

/// A camera for rendering the scene.
#[derive(Clone, Debug)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,
    /// Camera rotation
    pub rotation: Quat,
    /// Projection settings
    pub projection: Projection,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            rotation: Quat::IDENTITY,
            projection: Projection::Perspective {
                fov_y: 45.0_f32.to_radians(),
                aspect: 16.0 / 9.0,
                near: 0.1,
                far: 1000.0,
            },
        }
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the perspective projection.
    pub fn set_perspective(&mut self, fov_y: f32, aspect: f32, near: f32, far: f32) {
        self.projection = Projection::Perspective {
            fov_y,
            aspect,
            near,
            far,
        };
    }

    /// Set the orthographic projection.
    pub fn set_orthographic(
        &mut self,
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) {
        self.projection = Projection::Orthographic {
            left,
            right,
            bottom,
            top,
            near,
            far,
        };
    }

    /// Update the aspect ratio (for perspective projection).
    pub fn set_aspect(&mut self, aspect: f32) {
        if let Projection::Perspective {
            fov_y, near, far, ..
        } = self.projection
        {
            self.projection = Projection::Perspective {
                fov_y,
                aspect,
                near,
                far,
            };
        }
    }

    /// Get the view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        let forward = self.rotation * Vec3::NEG_Z;
        let target = self.position + forward;
        Mat4::look_at_rh(self.position, target, Vec3::Y)
    }

    /// Get the projection matrix (with Vulkan Y-flip).
    pub fn projection_matrix(&self) -> Mat4 {
        let mut proj = match self.projection {
            Projection::Perspective {
                fov_y,
                aspect,
                near,
                far,
            } => Mat4::perspective_rh(fov_y, aspect, near, far),
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => Mat4::orthographic_rh(left, right, bottom, top, near, far),
        };
        // Flip Y for Vulkan coordinate system
        proj.y_axis.y *= -1.0;
        proj
    }

    /// Get the view-projection matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Get the forward direction vector.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Get the right direction vector.
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Get the up direction vector.
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Look at a target position.
    pub fn look_at(&mut self, target: Vec3) {
        let forward = (target - self.position).normalize();
        if forward.length_squared() > 0.0 {
            self.rotation = Quat::from_rotation_arc(Vec3::NEG_Z, forward);
        }
    }
}

/// FPS-style camera controller.
///
/// Accumulates mouse deltas into yaw/pitch angles and keyboard input into a
/// movement vector, then applies both to a [`Camera`] each frame. Pitch is
/// clamped just short of straight up/down to keep the view matrix stable.
#[derive(Clone, Debug)]
pub struct FpsController {
    /// Movement speed in world units per second.
    pub move_speed: f32,
    /// Look sensitivity in radians per mouse pixel.
    pub look_sensitivity: f32,
    /// Accumulated yaw in radians (rotation around world Y).
    yaw: f32,
    /// Accumulated pitch in radians (rotation around local X).
    pitch: f32,
    /// Movement input along the camera's forward axis (-1..1).
    forward_input: f32,
    /// Movement input along the camera's right axis (-1..1).
    right_input: f32,
    /// Movement input along world up (-1..1).
    up_input: f32,
}

/// Keep pitch just short of +-90 degrees so look_at never degenerates.
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

impl FpsController {
    /// Create a controller with default speed and sensitivity.
    pub fn new() -> Self {
        Self::with_settings(3.0, 0.002)
    }

    /// Create a controller with the given movement speed (units/second) and
    /// look sensitivity (radians/pixel).
    pub fn with_settings(move_speed: f32, look_sensitivity: f32) -> Self {
        Self {
            move_speed,
            look_sensitivity,
            yaw: 0.0,
            pitch: 0.0,
            forward_input: 0.0,
            right_input: 0.0,
            up_input: 0.0,
        }
    }

    /// Current yaw in radians.
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Current pitch in radians.
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Feed a mouse movement delta (in pixels).
    ///
    /// Positive `dx` turns right, positive `dy` looks down (screen
    /// coordinates grow downward).
    pub fn process_mouse_movement(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * self.look_sensitivity;
        self.pitch -= dy * self.look_sensitivity;
        self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Set the movement input axes for this frame.
    ///
    /// Each axis is expected in -1..1: `forward` along the view direction,
    /// `right` strafing, `up` along world up.
    pub fn set_movement_input(&mut self, forward: f32, right: f32, up: f32) {
        self.forward_input = forward.clamp(-1.0, 1.0);
        self.right_input = right.clamp(-1.0, 1.0);
        self.up_input = up.clamp(-1.0, 1.0);
    }

    /// Apply the accumulated look and movement input to a camera.
    pub fn update_camera(&self, camera: &mut Camera, delta_time: f32) {
        camera.rotation = Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(self.pitch);

        let movement = camera.forward() * self.forward_input
            + camera.right() * self.right_input
            + Vec3::Y * self.up_input;

        if movement.length_squared() > 0.0 {
            camera.position += movement.normalize() * self.move_speed * delta_time;
        }
    }
}

impl Default for FpsController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_camera_default_looks_down_negative_z() {
        let camera = Camera::new();
        let forward = camera.forward();
        assert!(approx_eq(forward.x, 0.0));
        assert!(approx_eq(forward.y, 0.0));
        assert!(approx_eq(forward.z, -1.0));
    }

    #[test]
    fn test_projection_matrix_flips_y() {
        let camera = Camera::new();
        let proj = camera.projection_matrix();
        // Vulkan clip space has Y pointing down
        assert!(proj.y_axis.y < 0.0);
    }

    #[test]
    fn test_set_aspect_keeps_other_parameters() {
        let mut camera = Camera::new();
        camera.set_perspective(60.0_f32.to_radians(), 1.0, 0.5, 100.0);
        camera.set_aspect(2.0);

        match camera.projection {
            Projection::Perspective {
                fov_y,
                aspect,
                near,
                far,
            } => {
                assert!(approx_eq(fov_y, 60.0_f32.to_radians()));
                assert!(approx_eq(aspect, 2.0));
                assert!(approx_eq(near, 0.5));
                assert!(approx_eq(far, 100.0));
            }
            Projection::Orthographic { .. } => panic!("Projection type changed"),
        }
    }

    #[test]
    fn test_look_at_faces_target() {
        let mut camera = Camera::new();
        camera.position = Vec3::ZERO;
        camera.look_at(Vec3::new(10.0, 0.0, 0.0));

        let forward = camera.forward();
        assert!(approx_eq(forward.x, 1.0));
        assert!(approx_eq(forward.y, 0.0));
        assert!(approx_eq(forward.z, 0.0));
    }

    #[test]
    fn test_view_matrix_translates_origin() {
        let mut camera = Camera::new();
        camera.position = Vec3::new(0.0, 0.0, 5.0);

        // A point at the camera position maps to the view-space origin
        let p = camera.view_matrix().transform_point3(camera.position);
        assert!(p.length() < 1e-5);
    }

    #[test]
    fn test_controller_pitch_is_clamped() {
        let mut controller = FpsController::with_settings(3.0, 1.0);
        controller.process_mouse_movement(0.0, -10.0); // look far up
        assert!(controller.pitch() <= PITCH_LIMIT);

        controller.process_mouse_movement(0.0, 20.0); // look far down
        assert!(controller.pitch() >= -PITCH_LIMIT);
    }

    #[test]
    fn test_controller_moves_camera_forward() {
        let mut camera = Camera::new();
        camera.position = Vec3::ZERO;

        let mut controller = FpsController::with_settings(2.0, 0.002);
        controller.set_movement_input(1.0, 0.0, 0.0);
        controller.update_camera(&mut camera, 0.5);

        // Default orientation: forward is -Z, speed 2 for half a second
        assert!(approx_eq(camera.position.z, -1.0));
        assert!(approx_eq(camera.position.x, 0.0));
    }

    #[test]
    fn test_controller_yaw_turns_camera() {
        let mut camera = Camera::new();
        let mut controller = FpsController::with_settings(3.0, 1.0);

        // Quarter turn to the left (negative dx turns left)
        controller.process_mouse_movement(-std::f32::consts::FRAC_PI_2, 0.0);
        controller.update_camera(&mut camera, 0.0);

        let forward = camera.forward();
        assert!(approx_eq(forward.x, -1.0));
        assert!(forward.z.abs() < 1e-5);
    }

    #[test]
    fn test_controller_idle_does_not_move() {
        let mut camera = Camera::new();
        let start = camera.position;

        let controller = FpsController::new();
        controller.update_camera(&mut camera, 1.0);

        assert_eq!(camera.position, start);
    }
}
