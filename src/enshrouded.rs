//! The Enshrouded dedicated-server settings: catalog, groups, difficulty
//! rules, and the fallback template used when no release notes are found.

use serde_json::{Value, json};

use crate::catalog::{
    Catalog, ChoiceSetting, DurationSetting, FactorSetting, FreeformKind, FreeformSetting,
    Setting, SettingInfo, ToggleSetting,
};
use crate::error::SettingsError;
use crate::path::{self, ROLE_GROUPS_KEY, SettingPath};

/// Identity and network fields the randomizer never touches.
pub const RANDOMIZE_EXCLUDED: &[&str] = &["name", "saveDirectory", "logDirectory", "ip", "queryPort"];

pub const PRESET_PATH: &str = "gameSettingsPreset";
pub const CUSTOM_PRESET: &str = "Custom";

const DEFAULT_QUERY_PORT: i64 = 15637;
const DEFAULT_SLOT_COUNT: i64 = 16;

fn gs(key: &str) -> String {
    format!("gameSettings.{key}")
}

fn duration(key: &str, label: &str, description: &str, min: i64, max: i64, normal: i64) -> Setting {
    Setting::Duration(DurationSetting {
        info: SettingInfo::new(gs(key).as_str(), label, description),
        min_minutes: min,
        max_minutes: max,
        normal_minutes: normal,
    })
}

fn factor(key: &str, label: &str, hint: &str, bounds: (f64, f64), normal: f64, weight: i32) -> Setting {
    Setting::Factor(FactorSetting {
        info: SettingInfo::new(gs(key).as_str(), label, hint),
        min: bounds.0,
        max: bounds.1,
        normal,
        impact_weight: weight,
    })
}

fn choice(path: &str, label: &str, description: &str, options: &[&str], normal: &str) -> Setting {
    Setting::Choice(ChoiceSetting {
        info: SettingInfo::new(path, label, description),
        options: options.iter().map(|o| o.to_string()).collect(),
        normal: normal.to_string(),
    })
}

fn toggle(path: &str, label: &str, description: &str, normal: bool) -> Setting {
    Setting::Toggle(ToggleSetting {
        info: SettingInfo::new(path, label, description),
        normal,
    })
}

fn freeform(path: &str, label: &str, description: &str, kind: FreeformKind) -> Setting {
    Setting::Freeform(FreeformSetting {
        info: SettingInfo::new(path, label, description),
        kind,
    })
}

fn durations() -> Vec<Setting> {
    vec![
        duration("dayTimeDuration", "Day Duration", "Length of daytime in minutes.", 2, 60, 30),
        duration("nightTimeDuration", "Night Duration", "Length of nighttime in minutes.", 2, 60, 12),
        duration(
            "fromHungerToStarving",
            "Time to Starvation",
            "Time in minutes before starving starts.",
            5,
            20,
            10,
        ),
    ]
}

fn factors() -> Vec<Setting> {
    const WIDE: (f64, f64) = (0.25, 4.0);
    const HALF_TO_DOUBLE: (f64, f64) = (0.5, 2.0);
    const QUARTER_TO_DOUBLE: (f64, f64) = (0.25, 2.0);
    vec![
        factor("playerHealthFactor", "Player Health", "Player max health multiplier.", WIDE, 1.0, -2),
        factor("playerStaminaFactor", "Player Stamina", "Player max stamina multiplier.", WIDE, 1.0, -1),
        factor("playerManaFactor", "Player Mana", "Player max mana multiplier.", WIDE, 1.0, -1),
        factor("playerBodyHeatFactor", "Player Body Heat", "Player resistance to cold.", HALF_TO_DOUBLE, 1.0, 0),
        factor("foodBuffDurationFactor", "Food Buff Duration", "How long food buffs last.", HALF_TO_DOUBLE, 1.0, 0),
        factor("shroudTimeFactor", "Shroud Time", "Time allowed in Shroud.", HALF_TO_DOUBLE, 1.0, -2),
        factor("miningDamageFactor", "Mining Effectiveness", "Damage dealt by mining tools.", HALF_TO_DOUBLE, 1.0, 0),
        factor("plantGrowthSpeedFactor", "Plant Growth Speed", "How fast plants grow.", QUARTER_TO_DOUBLE, 1.0, 0),
        factor(
            "resourceDropStackAmountFactor",
            "Resources Gain",
            "Amount of resources dropped.",
            QUARTER_TO_DOUBLE,
            1.0,
            -2,
        ),
        factor(
            "factoryProductionSpeedFactor",
            "Workstation Effectiveness",
            "Crafting speed at workstations.",
            QUARTER_TO_DOUBLE,
            1.0,
            0,
        ),
        factor(
            "perkUpgradeRecyclingFactor",
            "Weapon Recycling Yield",
            "Runes returned when salvaging.",
            (0.0, 1.0),
            0.5,
            0,
        ),
        factor("perkCostFactor", "Weapon Upgrading Costs", "Cost to upgrade weapons.", QUARTER_TO_DOUBLE, 1.0, 0),
        factor("experienceCombatFactor", "Combat Experience", "XP gained from combat.", QUARTER_TO_DOUBLE, 1.0, -1),
        factor("experienceMiningFactor", "Mining Experience", "XP gained from mining.", (0.0, 2.0), 1.0, -1),
        factor(
            "experienceExplorationQuestsFactor",
            "Exploration/Quest XP",
            "XP from exploration/quests.",
            QUARTER_TO_DOUBLE,
            1.0,
            -1,
        ),
        factor("enemyDamageFactor", "Enemy Damage", "Damage dealt by non-boss enemies.", (0.25, 5.0), 1.0, 2),
        factor("enemyHealthFactor", "Enemy Health", "Health of non-boss enemies.", WIDE, 1.0, 2),
        factor(
            "enemyStaminaFactor",
            "Enemy Stun Modifier",
            "Stamina of non-boss enemies (stun resistance).",
            HALF_TO_DOUBLE,
            1.0,
            0,
        ),
        factor(
            "enemyPerceptionRangeFactor",
            "Enemy Perception",
            "How far enemies can see/hear.",
            HALF_TO_DOUBLE,
            1.0,
            0,
        ),
        factor("bossDamageFactor", "Boss Damage", "Damage dealt by bosses.", (0.2, 5.0), 1.0, 1),
        factor("bossHealthFactor", "Boss Health", "Health of bosses.", (0.2, 5.0), 1.0, 1),
        factor("threatBonus", "Enemy Attacks Modifier", "Player threat generation modifier.", WIDE, 1.0, 0),
    ]
}

fn choices() -> Vec<Setting> {
    const AMOUNTS: &[&str] = &["Few", "Normal", "Many", "Extreme"];
    vec![
        choice(
            &gs("tombstoneMode"),
            "Tombstone Mode",
            "What players drop on death.",
            &["AddBackpackMaterials", "Everything", "NoTombstone"],
            "AddBackpackMaterials",
        ),
        choice(
            &gs("tamingStartleRepercussion"),
            "Taming Startle Repercussion",
            "Penalty for startling creatures during taming.",
            &["KeepProgress", "LoseSomeProgress", "LoseAllProgress"],
            "LoseSomeProgress",
        ),
        choice(
            &gs("weatherFrequency"),
            "Weather Frequency",
            "How often weather changes.",
            &["Disabled", "Rare", "Normal", "Often"],
            "Normal",
        ),
        choice(
            &gs("curseModifier"),
            "Shroud Curse Modifier",
            "Chance of Shroud curse. Easy turns it off.",
            &["Easy", "Normal", "Hard"],
            "Normal",
        ),
        choice(
            PRESET_PATH,
            "Game Difficulty Preset",
            "Overall difficulty preset. Unless 'Custom', individual game settings may be ignored by the server.",
            &["Default", "Relaxed", "Hard", "Survival", CUSTOM_PRESET],
            "Default",
        ),
        choice("voiceChatMode", "Voice Chat Mode", "Voice chat type.", &["Proximity", "Global"], "Proximity"),
        choice(&gs("randomSpawnerAmount"), "Enemy Amount", "Controls density of enemies.", AMOUNTS, "Normal"),
        choice(
            &gs("aggroPoolAmount"),
            "Simultaneous Enemy Attacks",
            "How many enemies can attack at once.",
            AMOUNTS,
            "Normal",
        ),
    ]
}

fn plain_fields() -> Vec<Setting> {
    use FreeformKind::{Integer, Text};
    vec![
        freeform("name", "Server Name", "The name displayed in the server browser.", Text),
        freeform("saveDirectory", "Save Directory", "Folder where game saves are stored.", Text),
        freeform("logDirectory", "Log Directory", "Folder where server logs are stored.", Text),
        freeform("ip", "IP Address", "'0.0.0.0' binds to all network interfaces.", Text),
        freeform("queryPort", "Query Port", "Port for server browser queries.", Integer),
        freeform("slotCount", "Slot Count", "Maximum concurrent players (1-16).", Integer),
        toggle("enableTextChat", "Enable Text Chat", "Allow players to use text chat.", false),
        toggle("enableVoiceChat", "Enable Voice Chat", "Allow players to use voice chat.", false),
        toggle(
            &gs("enableDurability"),
            "Enable Item Durability",
            "Weapons and tools take durability damage.",
            true,
        ),
        toggle(
            &gs("enableStarvingDebuff"),
            "Enable Starving Debuff",
            "Players suffer debuffs when starving.",
            false,
        ),
        toggle(
            &gs("enableGliderTurbulences"),
            "Glider Turbulences",
            "Gliders are affected by air turbulence.",
            true,
        ),
        toggle(
            &gs("pacifyAllEnemies"),
            "Pacify All Enemies",
            "Enemies (not bosses) won't attack until provoked.",
            false,
        ),
    ]
}

fn role_fields() -> Vec<Setting> {
    use FreeformKind::{Integer, Text};
    vec![
        freeform("name", "Group Name", "Identifier for this user group.", Text),
        freeform("password", "Password", "Password for this group. Change the default passwords.", Text),
        toggle("canKickBan", "Can Kick/Ban", "Members may kick or ban other players.", false),
        toggle(
            "canAccessInventories",
            "Can Access Inventories",
            "Members may open other players' inventories and chests.",
            false,
        ),
        toggle("canEditBase", "Can Edit Base", "Members may modify player bases.", false),
        toggle("canExtendBase", "Can Extend Base", "Members may extend player bases.", false),
        freeform("reservedSlots", "Reserved Slots", "Server slots reserved for this group.", Integer),
    ]
}

/// Build the server catalog.
pub fn catalog() -> Result<Catalog, SettingsError> {
    let mut builder = Catalog::builder()
        .settings(durations())
        .settings(factors())
        .settings(choices())
        .settings(plain_fields())
        .group(
            "General",
            &[
                "name",
                "saveDirectory",
                "logDirectory",
                "ip",
                "queryPort",
                "slotCount",
                "enableTextChat",
                "enableVoiceChat",
                "voiceChatMode",
            ],
            false,
        )
        .group(
            "Player",
            &[
                "gameSettings.playerHealthFactor",
                "gameSettings.playerStaminaFactor",
                "gameSettings.playerManaFactor",
                "gameSettings.playerBodyHeatFactor",
                "gameSettings.enableDurability",
                "gameSettings.enableStarvingDebuff",
                "gameSettings.foodBuffDurationFactor",
                "gameSettings.fromHungerToStarving",
            ],
            true,
        )
        .group(
            "World",
            &[
                PRESET_PATH,
                "gameSettings.tombstoneMode",
                "gameSettings.dayTimeDuration",
                "gameSettings.nightTimeDuration",
                "gameSettings.enableGliderTurbulences",
                "gameSettings.weatherFrequency",
                "gameSettings.shroudTimeFactor",
                "gameSettings.curseModifier",
            ],
            true,
        )
        .group(
            "Enemy",
            &[
                "gameSettings.enemyHealthFactor",
                "gameSettings.enemyDamageFactor",
                "gameSettings.enemyStaminaFactor",
                "gameSettings.enemyPerceptionRangeFactor",
                "gameSettings.bossHealthFactor",
                "gameSettings.bossDamageFactor",
                "gameSettings.pacifyAllEnemies",
                "gameSettings.threatBonus",
                "gameSettings.randomSpawnerAmount",
                "gameSettings.aggroPoolAmount",
                "gameSettings.tamingStartleRepercussion",
            ],
            true,
        )
        .group(
            "Resources",
            &[
                "gameSettings.miningDamageFactor",
                "gameSettings.plantGrowthSpeedFactor",
                "gameSettings.resourceDropStackAmountFactor",
                "gameSettings.factoryProductionSpeedFactor",
                "gameSettings.perkUpgradeRecyclingFactor",
                "gameSettings.perkCostFactor",
            ],
            true,
        )
        .group(
            "Experience",
            &[
                "gameSettings.experienceCombatFactor",
                "gameSettings.experienceMiningFactor",
                "gameSettings.experienceExplorationQuestsFactor",
            ],
            true,
        )
        .threshold(3)
        .bonus("gameSettings.enableStarvingDebuff", json!(true), 2)
        .bonus("gameSettings.tombstoneMode", json!("Everything"), 1);
    for field in role_fields() {
        builder = builder.role_field(field);
    }
    builder.build()
}

/// A role group as it appears in the document.
pub fn role_group(name: &str, password: &str, permissions: [bool; 4]) -> Value {
    let [kick_ban, inventories, edit_base, extend_base] = permissions;
    json!({
        "name": name,
        "password": password,
        "canKickBan": kick_ban,
        "canAccessInventories": inventories,
        "canEditBase": edit_base,
        "canExtendBase": extend_base,
        "reservedSlots": 0,
    })
}

/// Template used when the release notes are missing or unreadable: every
/// catalog normal, the identity defaults, and the three stock role groups.
pub fn fallback_template(catalog: &Catalog) -> Value {
    let mut doc = json!({
        "name": "Enshrouded Server",
        "saveDirectory": "./savegame",
        "logDirectory": "./logs",
        "ip": "0.0.0.0",
        "queryPort": DEFAULT_QUERY_PORT,
        "slotCount": DEFAULT_SLOT_COUNT,
        "gameSettings": {},
    });
    for setting in catalog.settings() {
        if let Some(normal) = setting.normal_value() {
            path::set(&mut doc, setting.path(), normal);
        }
    }
    path::set(
        &mut doc,
        &SettingPath::from(ROLE_GROUPS_KEY),
        json!([
            role_group("Admin", "AdminPassword", [true, true, true, true]),
            role_group("Friend", "FriendPassword", [false, true, true, false]),
            role_group("Guest", "GuestPassword", [false, false, false, false]),
        ]),
    );
    doc
}
