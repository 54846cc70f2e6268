/// Starting tribes, in the order they are offered on the weekly pick screen
pub const TRIBES: [&str; 3] = ["Kalo", "Cila", "Vatu"];

/// Bonus for a correct pick during the tribal phase
pub const TRIBAL_BONUS: i64 = 5;

/// Initial draft picks allowed per team
pub const INITIAL_PICK_CAP: usize = 5;

/// Extra picks unlocked at the merge when the league enables them
pub const MERGE_PICK_CAP: usize = 1;

/// Weeks offered on the pick screen
pub const SEASON_WEEKS: u32 = 10;

/// Compare-and-swap attempts before a versioned admission gives up
pub const MAX_ADMISSION_ATTEMPTS: usize = 8;

/// Human-readable bonus, as shown next to a winning weekly pick.
pub fn bonus_label(points: i64) -> String {
    format!("+{} Points", points)
}
