//! Helper capability: helper role membership or a moderation permission.

use std::collections::HashMap;

use serenity::all::{GuildId, Permissions, RoleId, UserId};

/// Union of the `@everyone` role and the member's roles. The guild owner
/// implicitly holds every permission.
pub fn granted_permissions(
    guild_id: GuildId,
    guild_owner: UserId,
    member_id: UserId,
    member_roles: &[RoleId],
    role_permissions: &HashMap<RoleId, Permissions>,
) -> Permissions {
    if member_id == guild_owner {
        return Permissions::all();
    }
    let everyone = RoleId::new(guild_id.get());
    std::iter::once(&everyone)
        .chain(member_roles)
        .filter_map(|role| role_permissions.get(role))
        .fold(Permissions::empty(), |granted, permissions| {
            granted | *permissions
        })
}

pub fn is_helper_capable(
    member_roles: &[RoleId],
    helper_role: RoleId,
    granted: Permissions,
) -> bool {
    member_roles.contains(&helper_role)
        || granted.contains(Permissions::ADMINISTRATOR)
        || granted.contains(Permissions::MANAGE_MESSAGES)
}
