//! Boards command implementation

use fd44_core::board::{BoardDatabase, SensorKeyLayout};
use fd44_core::module::ModuleVariant;

/// List known board profiles
pub fn cmd_boards(boards: &BoardDatabase, variant: Option<ModuleVariant>, name: Option<&str>) {
    println!("Known boards:");
    println!();
    println!(
        "{:<24} {:<10} {:<26} {:<10}",
        "Board", "Module", "Address storage", "Sensor key"
    );
    println!("{}", "-".repeat(72));

    let mut shown = 0;
    for profile in boards.iter() {
        if variant.is_some_and(|v| v != profile.variant) {
            continue;
        }
        if let Some(filter) = name {
            if !profile.name.to_lowercase().contains(&filter.to_lowercase()) {
                continue;
            }
        }

        let key = match profile.sensor_key {
            SensorKeyLayout::None => "-".to_string(),
            SensorKeyLayout::Short => "short".to_string(),
            SensorKeyLayout::Long { magic } => format!("long {:?}", magic),
        };
        println!(
            "{:<24} {:<10} {:<26} {:<10}",
            profile.name,
            profile.variant.to_string(),
            profile.hardware_address.describe(),
            key
        );
        shown += 1;
    }

    println!();
    println!("{} of {} boards", shown, boards.len());
}
