//! Named teams: membership, leadership, invites, and allies
//!
//! A team has exactly one leader; the leader leaving disbands the team (no
//! ownership transfer path). Invites are capped by the maximum team size and
//! the cap is re-validated at acceptance time, since a team can fill between
//! invite and accept. Each team may hold exactly one ally, recorded on both
//! sides. Team membership never implies friendly-fire immunity in the
//! ability core; that policy belongs to the listener layer.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use elementum_core::PlayerId;

/// Stable team identifier (session-scoped counter, persisted in save data)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamId(pub u64);

/// Display colors for team names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TeamColor {
    #[default]
    White,
    Red,
    Gold,
    Yellow,
    Green,
    Aqua,
    Blue,
    Purple,
    Gray,
}

impl TeamColor {
    pub fn name(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Red => "red",
            Self::Gold => "gold",
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Aqua => "aqua",
            Self::Blue => "blue",
            Self::Purple => "purple",
            Self::Gray => "gray",
        }
    }

    /// Parse a user-typed color name, case-insensitive
    pub fn parse(input: &str) -> Option<Self> {
        [
            Self::White,
            Self::Red,
            Self::Gold,
            Self::Yellow,
            Self::Green,
            Self::Aqua,
            Self::Blue,
            Self::Purple,
            Self::Gray,
        ]
        .into_iter()
        .find(|c| c.name().eq_ignore_ascii_case(input))
    }
}

/// Name formatting attributes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStyle {
    pub color: TeamColor,
    pub bold: bool,
    pub italic: bool,
}

/// One named team
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub leader: PlayerId,
    pub members: BTreeSet<PlayerId>,
    /// Outstanding invites; ephemeral, cleared on restore
    #[serde(skip)]
    pub invites: BTreeSet<PlayerId>,
    pub ally: Option<TeamId>,
    pub style: TeamStyle,
}

/// Why a team operation was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TeamError {
    #[error("You are already in a team")]
    AlreadyInTeam,
    #[error("That player is already in a team")]
    TargetInTeam,
    #[error("You are not in a team")]
    NotInTeam,
    #[error("Only the team leader can do that")]
    NotLeader,
    #[error("The team is full ({max} members)")]
    TeamFull { max: usize },
    #[error("No such team")]
    NoSuchTeam,
    #[error("You have no invite to that team")]
    NoInvite,
    #[error("A team with that name already exists")]
    NameTaken,
    #[error("That team already has an ally")]
    AllyTaken,
    #[error("Those teams are not allied")]
    NotAllied,
    #[error("A team cannot ally itself")]
    SelfAlly,
    #[error("That player is not in your team")]
    NotAMember,
}

/// Save-data shape for `teams.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamSaveData {
    pub teams: Vec<Team>,
    pub next_id: u64,
}

/// All teams and the player -> team index
#[derive(Debug, Default)]
pub struct TeamManager {
    teams: HashMap<TeamId, Team>,
    by_player: HashMap<PlayerId, TeamId>,
    next_id: u64,
    max_size: usize,
}

impl TeamManager {
    pub fn new(max_size: usize) -> Self {
        Self {
            teams: HashMap::new(),
            by_player: HashMap::new(),
            next_id: 1,
            max_size,
        }
    }

    /// Create a team with `creator` as leader and sole member
    pub fn create(&mut self, creator: PlayerId, name: &str) -> Result<TeamId, TeamError> {
        if self.by_player.contains_key(&creator) {
            return Err(TeamError::AlreadyInTeam);
        }
        if self.teams.values().any(|t| t.name.eq_ignore_ascii_case(name)) {
            return Err(TeamError::NameTaken);
        }

        let id = TeamId(self.next_id);
        self.next_id += 1;

        let mut members = BTreeSet::new();
        members.insert(creator);
        self.teams.insert(
            id,
            Team {
                id,
                name: name.to_string(),
                leader: creator,
                members,
                invites: BTreeSet::new(),
                ally: None,
                style: TeamStyle::default(),
            },
        );
        self.by_player.insert(creator, id);
        Ok(id)
    }

    /// Leader invites `target`. Capped so members + outstanding invites never
    /// exceed the maximum size.
    pub fn invite(&mut self, leader: PlayerId, target: PlayerId) -> Result<TeamId, TeamError> {
        let id = self.require_leader(leader)?;
        if self.by_player.contains_key(&target) {
            return Err(TeamError::TargetInTeam);
        }
        let max = self.max_size;
        let team = self.teams.get_mut(&id).ok_or(TeamError::NoSuchTeam)?;
        if team.members.len() + team.invites.len() >= max {
            return Err(TeamError::TeamFull { max });
        }
        team.invites.insert(target);
        Ok(id)
    }

    /// Accept an invite. The size cap is re-validated here: the team may have
    /// filled since the invite went out.
    pub fn accept_invite(&mut self, player: PlayerId, team_id: TeamId) -> Result<(), TeamError> {
        if self.by_player.contains_key(&player) {
            return Err(TeamError::AlreadyInTeam);
        }
        let max = self.max_size;
        let team = self.teams.get_mut(&team_id).ok_or(TeamError::NoSuchTeam)?;
        if !team.invites.remove(&player) {
            return Err(TeamError::NoInvite);
        }
        if team.members.len() >= max {
            return Err(TeamError::TeamFull { max });
        }
        team.members.insert(player);
        self.by_player.insert(player, team_id);
        Ok(())
    }

    /// Leave the current team. The leader leaving disbands it.
    pub fn leave(&mut self, player: PlayerId) -> Result<(), TeamError> {
        let id = *self.by_player.get(&player).ok_or(TeamError::NotInTeam)?;
        let is_leader = self
            .teams
            .get(&id)
            .map(|t| t.leader == player)
            .unwrap_or(false);

        if is_leader {
            self.disband_internal(id);
        } else if let Some(team) = self.teams.get_mut(&id) {
            team.members.remove(&player);
            self.by_player.remove(&player);
        }
        Ok(())
    }

    /// Leader kicks a member (not themselves)
    pub fn kick(&mut self, leader: PlayerId, target: PlayerId) -> Result<(), TeamError> {
        let id = self.require_leader(leader)?;
        if leader == target {
            return Err(TeamError::NotAMember);
        }
        let team = self.teams.get_mut(&id).ok_or(TeamError::NoSuchTeam)?;
        if !team.members.remove(&target) {
            return Err(TeamError::NotAMember);
        }
        self.by_player.remove(&target);
        Ok(())
    }

    /// Leader disbands the team
    pub fn disband(&mut self, leader: PlayerId) -> Result<(), TeamError> {
        let id = self.require_leader(leader)?;
        self.disband_internal(id);
        Ok(())
    }

    fn disband_internal(&mut self, id: TeamId) {
        if let Some(team) = self.teams.remove(&id) {
            for member in &team.members {
                self.by_player.remove(member);
            }
            // Sever the ally link from the other side
            if let Some(ally_id) = team.ally {
                if let Some(ally) = self.teams.get_mut(&ally_id) {
                    ally.ally = None;
                }
            }
        }
    }

    /// Leader renames the team
    pub fn rename(&mut self, leader: PlayerId, name: &str) -> Result<(), TeamError> {
        let id = self.require_leader(leader)?;
        if self
            .teams
            .values()
            .any(|t| t.id != id && t.name.eq_ignore_ascii_case(name))
        {
            return Err(TeamError::NameTaken);
        }
        if let Some(team) = self.teams.get_mut(&id) {
            team.name = name.to_string();
        }
        Ok(())
    }

    /// Leader changes display style
    pub fn set_style(&mut self, leader: PlayerId, style: TeamStyle) -> Result<(), TeamError> {
        let id = self.require_leader(leader)?;
        if let Some(team) = self.teams.get_mut(&id) {
            team.style = style;
        }
        Ok(())
    }

    /// Ally two teams. Strictly one ally per team, recorded symmetrically.
    pub fn add_ally(&mut self, leader: PlayerId, other: TeamId) -> Result<(), TeamError> {
        let id = self.require_leader(leader)?;
        if id == other {
            return Err(TeamError::SelfAlly);
        }
        if !self.teams.contains_key(&other) {
            return Err(TeamError::NoSuchTeam);
        }
        let own_ally = self.teams.get(&id).and_then(|t| t.ally);
        let other_ally = self.teams.get(&other).and_then(|t| t.ally);
        if own_ally.is_some() || other_ally.is_some() {
            return Err(TeamError::AllyTaken);
        }

        if let Some(team) = self.teams.get_mut(&id) {
            team.ally = Some(other);
        }
        if let Some(ally) = self.teams.get_mut(&other) {
            ally.ally = Some(id);
        }
        Ok(())
    }

    /// Remove the ally link from both sides
    pub fn remove_ally(&mut self, leader: PlayerId) -> Result<(), TeamError> {
        let id = self.require_leader(leader)?;
        let ally_id = self
            .teams
            .get(&id)
            .and_then(|t| t.ally)
            .ok_or(TeamError::NotAllied)?;

        if let Some(team) = self.teams.get_mut(&id) {
            team.ally = None;
        }
        if let Some(ally) = self.teams.get_mut(&ally_id) {
            ally.ally = None;
        }
        Ok(())
    }

    fn require_leader(&self, player: PlayerId) -> Result<TeamId, TeamError> {
        let id = *self.by_player.get(&player).ok_or(TeamError::NotInTeam)?;
        let team = self.teams.get(&id).ok_or(TeamError::NoSuchTeam)?;
        if team.leader != player {
            return Err(TeamError::NotLeader);
        }
        Ok(id)
    }

    pub fn team_of(&self, player: PlayerId) -> Option<&Team> {
        self.by_player.get(&player).and_then(|id| self.teams.get(id))
    }

    pub fn get(&self, id: TeamId) -> Option<&Team> {
        self.teams.get(&id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Team> {
        self.teams.values().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn same_team(&self, a: PlayerId, b: PlayerId) -> bool {
        match (self.by_player.get(&a), self.by_player.get(&b)) {
            (Some(ta), Some(tb)) => ta == tb,
            _ => false,
        }
    }

    pub fn are_allied(&self, a: PlayerId, b: PlayerId) -> bool {
        let (Some(&ta), Some(&tb)) = (self.by_player.get(&a), self.by_player.get(&b)) else {
            return false;
        };
        self.teams.get(&ta).and_then(|t| t.ally) == Some(tb)
    }

    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    /// Snapshot for `teams.json`
    pub fn to_save_data(&self) -> TeamSaveData {
        let mut teams: Vec<Team> = self.teams.values().cloned().collect();
        teams.sort_by_key(|t| t.id);
        TeamSaveData {
            teams,
            next_id: self.next_id,
        }
    }

    /// Rebuild from save data. Invites are ephemeral and start empty.
    pub fn from_save_data(data: &TeamSaveData, max_size: usize) -> Self {
        let mut manager = Self::new(max_size);
        manager.next_id = data.next_id.max(1);
        for team in &data.teams {
            let mut team = team.clone();
            team.invites.clear();
            for member in &team.members {
                manager.by_player.insert(*member, team.id);
            }
            manager.teams.insert(team.id, team);
        }
        manager
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: usize = 5;

    #[test]
    fn test_create_requires_no_existing_team() {
        let mut teams = TeamManager::new(MAX);
        let p = PlayerId::new();
        teams.create(p, "Alpha").unwrap();
        assert_eq!(teams.create(p, "Beta"), Err(TeamError::AlreadyInTeam));
    }

    #[test]
    fn test_invite_and_accept() {
        let mut teams = TeamManager::new(MAX);
        let leader = PlayerId::new();
        let member = PlayerId::new();

        let id = teams.create(leader, "Alpha").unwrap();
        teams.invite(leader, member).unwrap();
        teams.accept_invite(member, id).unwrap();

        assert!(teams.same_team(leader, member));
        assert_eq!(teams.get(id).unwrap().members.len(), 2);
    }

    #[test]
    fn test_accept_revalidates_cap() {
        let mut teams = TeamManager::new(2);
        let leader = PlayerId::new();
        let first = PlayerId::new();
        let second = PlayerId::new();

        let id = teams.create(leader, "Alpha").unwrap();
        teams.invite(leader, first).unwrap();
        // Team fills before `first` accepts
        teams.get_mut_for_test(id).members.insert(second);
        teams.by_player.insert(second, id);

        assert_eq!(
            teams.accept_invite(first, id),
            Err(TeamError::TeamFull { max: 2 })
        );
        assert!(teams.team_of(first).is_none());
    }

    #[test]
    fn test_invites_capped_by_size() {
        let mut teams = TeamManager::new(2);
        let leader = PlayerId::new();
        teams.create(leader, "Alpha").unwrap();

        teams.invite(leader, PlayerId::new()).unwrap();
        assert_eq!(
            teams.invite(leader, PlayerId::new()),
            Err(TeamError::TeamFull { max: 2 })
        );
    }

    #[test]
    fn test_only_leader_invites() {
        let mut teams = TeamManager::new(MAX);
        let leader = PlayerId::new();
        let member = PlayerId::new();

        let id = teams.create(leader, "Alpha").unwrap();
        teams.invite(leader, member).unwrap();
        teams.accept_invite(member, id).unwrap();

        assert_eq!(
            teams.invite(member, PlayerId::new()),
            Err(TeamError::NotLeader)
        );
    }

    #[test]
    fn test_leader_leaving_disbands() {
        let mut teams = TeamManager::new(MAX);
        let leader = PlayerId::new();
        let member = PlayerId::new();

        let id = teams.create(leader, "Alpha").unwrap();
        teams.invite(leader, member).unwrap();
        teams.accept_invite(member, id).unwrap();

        teams.leave(leader).unwrap();
        assert!(teams.get(id).is_none());
        assert!(teams.team_of(member).is_none());
    }

    #[test]
    fn test_member_leaving_keeps_team() {
        let mut teams = TeamManager::new(MAX);
        let leader = PlayerId::new();
        let member = PlayerId::new();

        let id = teams.create(leader, "Alpha").unwrap();
        teams.invite(leader, member).unwrap();
        teams.accept_invite(member, id).unwrap();

        teams.leave(member).unwrap();
        assert!(teams.get(id).is_some());
        assert!(teams.team_of(leader).is_some());
    }

    #[test]
    fn test_kick() {
        let mut teams = TeamManager::new(MAX);
        let leader = PlayerId::new();
        let member = PlayerId::new();

        let id = teams.create(leader, "Alpha").unwrap();
        teams.invite(leader, member).unwrap();
        teams.accept_invite(member, id).unwrap();

        teams.kick(leader, member).unwrap();
        assert!(teams.team_of(member).is_none());
        assert_eq!(teams.kick(leader, member), Err(TeamError::NotAMember));
    }

    #[test]
    fn test_ally_is_symmetric_and_exclusive() {
        let mut teams = TeamManager::new(MAX);
        let a = PlayerId::new();
        let b = PlayerId::new();
        let c = PlayerId::new();

        let ta = teams.create(a, "Alpha").unwrap();
        let tb = teams.create(b, "Beta").unwrap();
        let tc = teams.create(c, "Gamma").unwrap();

        teams.add_ally(a, tb).unwrap();
        assert!(teams.are_allied(a, b));
        assert!(teams.are_allied(b, a));

        // Both sides already allied; a third team cannot join the pair
        assert_eq!(teams.add_ally(c, ta), Err(TeamError::AllyTaken));
        assert_eq!(teams.add_ally(a, tc), Err(TeamError::AllyTaken));

        teams.remove_ally(b).unwrap();
        assert!(!teams.are_allied(a, b));
        assert!(!teams.are_allied(b, a));
    }

    #[test]
    fn test_disband_severs_ally_link() {
        let mut teams = TeamManager::new(MAX);
        let a = PlayerId::new();
        let b = PlayerId::new();

        teams.create(a, "Alpha").unwrap();
        let tb = teams.create(b, "Beta").unwrap();
        teams.add_ally(a, tb).unwrap();

        teams.disband(a).unwrap();
        assert_eq!(teams.get(tb).unwrap().ally, None);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut teams = TeamManager::new(MAX);
        teams.create(PlayerId::new(), "Alpha").unwrap();
        assert_eq!(
            teams.create(PlayerId::new(), "alpha"),
            Err(TeamError::NameTaken)
        );
    }

    #[test]
    fn test_save_data_roundtrip() {
        let mut teams = TeamManager::new(MAX);
        let leader = PlayerId::new();
        let member = PlayerId::new();
        let other = PlayerId::new();

        let id = teams.create(leader, "Alpha").unwrap();
        teams.invite(leader, member).unwrap();
        teams.accept_invite(member, id).unwrap();
        let tb = teams.create(other, "Beta").unwrap();
        teams.add_ally(leader, tb).unwrap();
        teams
            .set_style(
                leader,
                TeamStyle { color: TeamColor::Red, bold: true, italic: false },
            )
            .unwrap();

        let json = serde_json::to_string(&teams.to_save_data()).unwrap();
        let loaded: TeamSaveData = serde_json::from_str(&json).unwrap();
        let restored = TeamManager::from_save_data(&loaded, MAX);

        assert!(restored.same_team(leader, member));
        assert!(restored.are_allied(leader, other));
        let team = restored.team_of(leader).unwrap();
        assert_eq!(team.style.color, TeamColor::Red);
        assert!(team.style.bold);
        assert!(team.invites.is_empty());
    }

    impl TeamManager {
        fn get_mut_for_test(&mut self, id: TeamId) -> &mut Team {
            self.teams.get_mut(&id).unwrap()
        }
    }
}
