//! The protocol every end-to-end test speaks: one replicated bullet,
//! one replicated pickup, and one predicted action.

use std::collections::HashMap;

use tether_server::{AttemptContext, AttemptHandler};
use tether_shared::{
    ActionErrorCode, FieldValue, KindRegistration, Protocol, Schema, UserId, WireType,
};

use crate::test_world::Bullet;

/// Builds the locked schema both hosts agree on.
///
/// Sorted names fix the ids: kind `bullet` = 0, `item_entity` = 1;
/// bullet fields `pos` = 0, `test` = 1; action `projectile_shot` = 0.
pub fn protocol() -> Schema {
    let mut protocol = Protocol::builder();
    protocol
        .add_kind(
            "bullet",
            vec![
                ("pos", WireType::Vec2(Box::new(WireType::F32))),
                ("test", WireType::F32),
            ],
            vec![("bounce", vec![WireType::F32])],
        )
        .add_kind("item_entity", vec![("count", WireType::U8)], vec![])
        .add_action(
            "projectile_shot",
            vec![WireType::Vec2(Box::new(WireType::F32))],
            vec![WireType::U32],
        );
    protocol.build()
}

pub static REGISTRATIONS: &[KindRegistration] = &[
    KindRegistration {
        name: "bullet",
        replicated_fields: &["pos", "test"],
    },
    KindRegistration {
        name: "item_entity",
        replicated_fields: &["count"],
    },
];

/// Arbiter for `projectile_shot`: spends one round of the requesting
/// user's ammo and spawns the bullet. The result value is the spawned
/// bullet's raw entity id.
pub struct ProjectileShotAttempt {
    ammo: HashMap<UserId, u32>,
}

impl ProjectileShotAttempt {
    pub fn new() -> Self {
        Self {
            ammo: HashMap::new(),
        }
    }

    pub fn with_ammo(mut self, user: UserId, rounds: u32) -> Self {
        self.ammo.insert(user, rounds);
        self
    }
}

impl Default for ProjectileShotAttempt {
    fn default() -> Self {
        Self::new()
    }
}

impl AttemptHandler for ProjectileShotAttempt {
    fn attempt_action(
        &mut self,
        ctx: &mut AttemptContext,
        args: &[FieldValue],
    ) -> Result<Vec<FieldValue>, ActionErrorCode> {
        let direction = match args.first() {
            Some(FieldValue::Vec2(x, y)) => (*x, *y),
            _ => return Err(ActionErrorCode::InvalidTarget),
        };

        let rounds = self.ammo.entry(ctx.user).or_insert(0);
        if *rounds == 0 {
            return Err(ActionErrorCode::OutOfAmmo);
        }
        *rounds -= 1;

        let bullet = ctx.spawn_entity(Bullet::boxed(direction.0 as f32, direction.1 as f32));
        if let Some(replica) = ctx.world.replica_mut(bullet) {
            replica.set_field(0, FieldValue::Vec2(0.0, 0.0));
        }
        Ok(vec![FieldValue::U32(bullet.to_raw())])
    }
}
