//! Entities implementing the test protocol's kinds.

use tether_shared::{Entity, EntityBase, TickContext, Vec2};

/// Replicated kind `bullet`. Flies in a straight line; purely-local
/// velocity, replicated position.
pub struct Bullet {
    base: EntityBase,
    pub velocity: Vec2,
}

impl Bullet {
    pub fn boxed(vx: f32, vy: f32) -> Box<dyn Entity> {
        Box::new(Self {
            base: EntityBase::default(),
            velocity: Vec2 { x: vx, y: vy },
        })
    }
}

impl Entity for Bullet {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn kind(&self) -> &'static str {
        "bullet"
    }

    fn update(&mut self, dt: f32, _ctx: &mut TickContext) {
        self.base.position = self.base.position + self.velocity * dt;
    }
}

/// Replicated kind `item_entity`. Sits still holding a stack count.
pub struct ItemEntity {
    base: EntityBase,
    pub count: u8,
}

impl ItemEntity {
    pub fn boxed(count: u8) -> Box<dyn Entity> {
        Box::new(Self {
            base: EntityBase::default(),
            count,
        })
    }
}

impl Entity for ItemEntity {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn kind(&self) -> &'static str {
        "item_entity"
    }
}
