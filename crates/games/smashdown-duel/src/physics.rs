/// Position and per-tick velocity. y grows downward; the ground is y = 0 and
/// anything above it is negative.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

impl Body {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }
}

/// Which arena wall a shell touched this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wall {
    Left,
    Right,
}

/// Move by velocity, then apply gravity or settle on the ground.
/// Returns true when the body is resting on the ground after the step.
fn step(body: &mut Body, gravity: f32) -> bool {
    // Drop non-finite velocity instead of poisoning the position.
    if !body.vx.is_finite() {
        body.vx = 0.0;
    }
    if !body.vy.is_finite() {
        body.vy = 0.0;
    }

    body.x += body.vx;
    body.y += body.vy;

    if body.y < 0.0 {
        body.vy += gravity;
        false
    } else {
        body.y = 0.0;
        body.vy = 0.0;
        true
    }
}

/// Advance a fighter one tick and clamp it inside `[0, max_x]`.
/// Clears `airborne` on ground contact and returns true if this step landed.
pub fn integrate_fighter(body: &mut Body, airborne: &mut bool, gravity: f32, max_x: f32) -> bool {
    let grounded = step(body, gravity);
    let landed = grounded && *airborne;
    if grounded {
        *airborne = false;
    }
    body.x = body.x.clamp(0.0, max_x);
    landed
}

/// Advance a shell one tick. On reaching either wall the shell is snapped to
/// it and its horizontal velocity is pointed back into the arena.
pub fn integrate_shell(body: &mut Body, gravity: f32, max_x: f32) -> Option<Wall> {
    step(body, gravity);
    if body.x <= 0.0 {
        body.x = 0.0;
        body.vx = body.vx.abs();
        Some(Wall::Left)
    } else if body.x >= max_x {
        body.x = max_x;
        body.vx = -body.vx.abs();
        Some(Wall::Right)
    } else {
        None
    }
}
