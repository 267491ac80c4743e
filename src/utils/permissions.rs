use serenity::all::{
    GuildId, PermissionOverwrite, PermissionOverwriteType, Permissions, RoleId, UserId,
};

/// Permissions granted to each party of a ticket channel.
pub const TICKET_MEMBER_PERMISSIONS: Permissions =
    Permissions::VIEW_CHANNEL.union(Permissions::SEND_MESSAGES);

/// Overwrites that hide a channel from the guild and open it to the
/// requester and the bot.
pub fn ticket_overwrites(guild_id: GuildId, requester: UserId, bot: UserId) -> Vec<PermissionOverwrite> {
    let everyone_role = RoleId::new(guild_id.get()); // @everyone role ID == guild ID

    vec![
        PermissionOverwrite {
            allow: Permissions::empty(),
            deny: Permissions::VIEW_CHANNEL,
            kind: PermissionOverwriteType::Role(everyone_role),
        },
        member_overwrite(requester),
        member_overwrite(bot),
    ]
}

fn member_overwrite(user: UserId) -> PermissionOverwrite {
    PermissionOverwrite {
        allow: TICKET_MEMBER_PERMISSIONS,
        deny: Permissions::empty(),
        kind: PermissionOverwriteType::Member(user),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_channel_is_private_to_requester_and_bot() {
        let guild = GuildId::new(10);
        let requester = UserId::new(20);
        let bot = UserId::new(30);

        let overwrites = ticket_overwrites(guild, requester, bot);
        assert_eq!(overwrites.len(), 3);

        let everyone = &overwrites[0];
        assert_eq!(everyone.kind, PermissionOverwriteType::Role(RoleId::new(10)));
        assert_eq!(everyone.deny, Permissions::VIEW_CHANNEL);
        assert!(everyone.allow.is_empty());

        let members: Vec<_> = overwrites[1..].iter().map(|o| o.kind).collect();
        assert_eq!(
            members,
            vec![
                PermissionOverwriteType::Member(requester),
                PermissionOverwriteType::Member(bot),
            ]
        );
        for overwrite in &overwrites[1..] {
            assert!(overwrite.allow.view_channel());
            assert!(overwrite.allow.send_messages());
            assert!(overwrite.deny.is_empty());
        }
    }
}
