//! Static command table.
//!
//! Command codes are the wire protocol between client and host; the table
//! below is indexed by code and must not be reordered.

/// Category of a command, in canonical sort order.
///
/// `Undefined` sorts first. Commands of this category cannot be
/// round-tripped and are dropped on rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CommandType {
    Undefined,
    Ship,
    Planet,
    Base,
    Other,
}

/// Static description of one command code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandInfo {
    pub code: u16,
    pub kind: CommandType,
    /// Payload size; `None` for variable-length commands.
    pub fixed_size: Option<usize>,
    /// Offset of the affected field in the ship/planet/base record.
    pub record_offset: usize,
    pub name: &'static str,
}

/// Ship commands.
pub mod ship {
    pub const CHANGE_FC: u16 = 1;
    pub const CHANGE_SPEED: u16 = 2;
    pub const CHANGE_WAYPOINT: u16 = 3;
    pub const CHANGE_MISSION: u16 = 4;
    pub const CHANGE_PRIMARY_ENEMY: u16 = 5;
    pub const TOW_SHIP: u16 = 6;
    pub const CHANGE_NAME: u16 = 7;
    pub const BEAM_DOWN_CARGO: u16 = 8;
    pub const TRANSFER_CARGO: u16 = 9;
    pub const INTERCEPT: u16 = 10;
    pub const CHANGE_NEUTRONIUM: u16 = 11;
    pub const CHANGE_TRITANIUM: u16 = 12;
    pub const CHANGE_DURANIUM: u16 = 13;
    pub const CHANGE_MOLYBDENUM: u16 = 14;
    pub const CHANGE_SUPPLIES: u16 = 15;
    pub const CHANGE_COLONISTS: u16 = 16;
    pub const CHANGE_TORPEDOES: u16 = 17;
    pub const CHANGE_MONEY: u16 = 18;
}

/// Planet commands.
pub mod planet {
    pub const CHANGE_FC: u16 = 21;
    pub const INCREASE_MINES: u16 = 22;
    pub const INCREASE_FACTORIES: u16 = 23;
    pub const INCREASE_DEFENSE: u16 = 24;
    pub const CHANGE_NEUTRONIUM: u16 = 25;
    pub const CHANGE_TRITANIUM: u16 = 26;
    pub const CHANGE_DURANIUM: u16 = 27;
    pub const CHANGE_MOLYBDENUM: u16 = 28;
    pub const CHANGE_COLONISTS: u16 = 29;
    pub const CHANGE_SUPPLIES: u16 = 30;
    pub const CHANGE_MONEY: u16 = 31;
    pub const COLONIST_TAX: u16 = 32;
    pub const NATIVE_TAX: u16 = 33;
    pub const BUILD_BASE: u16 = 34;
}

/// Starbase commands.
pub mod base {
    pub const CHANGE_DEFENSE: u16 = 40;
    pub const UPGRADE_ENGINE_TECH: u16 = 41;
    pub const UPGRADE_HULL_TECH: u16 = 42;
    pub const UPGRADE_WEAPON_TECH: u16 = 43;
    pub const BUILD_ENGINES: u16 = 44;
    pub const BUILD_HULLS: u16 = 45;
    pub const BUILD_WEAPONS: u16 = 46;
    pub const BUILD_LAUNCHERS: u16 = 47;
    pub const BUILD_TORPEDOES: u16 = 48;
    pub const BUILD_FIGHTERS: u16 = 49;
    pub const FIX_RECYCLE_SHIP_ID: u16 = 50;
    pub const FIX_RECYCLE_SHIP: u16 = 51;
    pub const CHANGE_MISSION: u16 = 52;
    pub const BUILD_SHIP: u16 = 53;
    pub const UPGRADE_TORP_TECH: u16 = 54;
}

/// Commands not bound to a game object.
pub mod other {
    pub const SEND_MESSAGE: u16 = 60;
    pub const CHANGE_PASSWORD: u16 = 61;
    pub const SEND_BACK: u16 = 62;
}

/// Number of code slots in the table.
pub const NUM_COMMAND_CODES: usize = 63;

const fn undefined(code: u16) -> CommandInfo {
    CommandInfo {
        code,
        kind: CommandType::Undefined,
        fixed_size: None,
        record_offset: 0,
        name: "",
    }
}

const fn fixed(
    code: u16,
    kind: CommandType,
    size: usize,
    record_offset: usize,
    name: &'static str,
) -> CommandInfo {
    CommandInfo {
        code,
        kind,
        fixed_size: Some(size),
        record_offset,
        name,
    }
}

const fn variable(code: u16, name: &'static str) -> CommandInfo {
    CommandInfo {
        code,
        kind: CommandType::Other,
        fixed_size: None,
        record_offset: 0,
        name,
    }
}

use CommandType::{Base, Other, Planet, Ship};

static COMMANDS: [CommandInfo; NUM_COMMAND_CODES] = [
    undefined(0),
    fixed(1, Ship, 3, 4, "ShipChangeFc"),
    fixed(2, Ship, 2, 7, "ShipChangeSpeed"),
    fixed(3, Ship, 4, 9, "ShipChangeWaypoint"),
    fixed(4, Ship, 2, 33, "ShipChangeMission"),
    fixed(5, Ship, 2, 35, "ShipChangePrimaryEnemy"),
    fixed(6, Ship, 2, 37, "ShipTowShip"),
    fixed(7, Ship, 20, 45, "ShipChangeName"),
    fixed(8, Ship, 14, 75, "ShipBeamDownCargo"),
    fixed(9, Ship, 14, 89, "ShipTransferCargo"),
    fixed(10, Ship, 2, 103, "ShipIntercept"),
    fixed(11, Ship, 2, 65, "ShipChangeNeutronium"),
    fixed(12, Ship, 2, 67, "ShipChangeTritanium"),
    fixed(13, Ship, 2, 69, "ShipChangeDuranium"),
    fixed(14, Ship, 2, 71, "ShipChangeMolybdenum"),
    fixed(15, Ship, 2, 73, "ShipChangeSupplies"),
    fixed(16, Ship, 2, 43, "ShipChangeColonists"),
    fixed(17, Ship, 2, 29, "ShipChangeTorpedoes"),
    fixed(18, Ship, 2, 105, "ShipChangeMoney"),
    undefined(19),
    undefined(20),
    fixed(21, Planet, 3, 4, "PlanetChangeFc"),
    fixed(22, Planet, 2, 7, "PlanetIncreaseMines"),
    fixed(23, Planet, 2, 9, "PlanetIncreaseFactories"),
    fixed(24, Planet, 2, 11, "PlanetIncreaseDefense"),
    fixed(25, Planet, 4, 13, "PlanetChangeNeutronium"),
    fixed(26, Planet, 4, 17, "PlanetChangeTritanium"),
    fixed(27, Planet, 4, 21, "PlanetChangeDuranium"),
    fixed(28, Planet, 4, 25, "PlanetChangeMolybdenum"),
    fixed(29, Planet, 4, 29, "PlanetChangeColonists"),
    fixed(30, Planet, 4, 33, "PlanetChangeSupplies"),
    fixed(31, Planet, 4, 37, "PlanetChangeMoney"),
    fixed(32, Planet, 2, 65, "PlanetColonistTax"),
    fixed(33, Planet, 2, 67, "PlanetNativeTax"),
    fixed(34, Planet, 2, 83, "PlanetBuildBase"),
    undefined(35),
    undefined(36),
    undefined(37),
    undefined(38),
    undefined(39),
    fixed(40, Base, 2, 4, "BaseChangeDefense"),
    fixed(41, Base, 2, 8, "BaseUpgradeEngineTech"),
    fixed(42, Base, 2, 10, "BaseUpgradeHullTech"),
    fixed(43, Base, 2, 12, "BaseUpgradeWeaponTech"),
    fixed(44, Base, 18, 16, "BaseBuildEngines"),
    fixed(45, Base, 40, 34, "BaseBuildHulls"),
    fixed(46, Base, 20, 74, "BaseBuildWeapons"),
    fixed(47, Base, 20, 94, "BaseBuildLaunchers"),
    fixed(48, Base, 20, 114, "BaseBuildTorpedoes"),
    fixed(49, Base, 2, 134, "BaseBuildFighters"),
    fixed(50, Base, 2, 136, "BaseFixRecycleShipId"),
    fixed(51, Base, 2, 138, "BaseFixRecycleShip"),
    fixed(52, Base, 2, 140, "BaseChangeMission"),
    fixed(53, Base, 14, 142, "BaseBuildShip"),
    fixed(54, Base, 2, 14, "BaseUpgradeTorpTech"),
    undefined(55),
    undefined(56),
    undefined(57),
    undefined(58),
    undefined(59),
    variable(60, "SendMessage"),
    fixed(61, Other, 10, 0, "ChangePassword"),
    variable(62, "SendBack"),
];

/// Looks up a command code.
///
/// Returns `None` for codes outside the table and for undefined slots.
#[must_use]
pub fn lookup(code: u16) -> Option<&'static CommandInfo> {
    COMMANDS
        .get(usize::from(code))
        .filter(|info| info.kind != CommandType::Undefined)
}

/// Returns the category of a command code.
#[must_use]
pub fn command_type(code: u16) -> CommandType {
    lookup(code).map_or(CommandType::Undefined, |info| info.kind)
}

/// Returns the symbolic name of a command code, or `""` if unknown.
#[must_use]
pub fn command_name(code: u16) -> &'static str {
    lookup(code).map_or("", |info| info.name)
}
