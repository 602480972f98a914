//! Show command implementation

use super::load_image;
use fd44_core::board::{BoardDatabase, BoardProfile, ProfileSource, SensorKeyLayout};
use fd44_core::record::{ModuleRecord, SerialFormat};
use fd44_core::{decode_with, Decoded, ImageInfo, Undecided};
use std::path::Path;

/// Decode an image and print its identity fields
pub fn cmd_show(input: &Path, boards: &BoardDatabase) -> Result<(), Box<dyn std::error::Error>> {
    let image = load_image(input)?;
    let decoded = decode_with(&image, boards)?;
    print_decoded(&decoded);
    Ok(())
}

/// Print a decode result
pub fn print_decoded(decoded: &Decoded) {
    print_image_info(decoded.info());
    println!();

    match decoded {
        Decoded::Valid(valid) => {
            println!("Module:          0x{:08X}, data present", valid.module_offset);
            print_profile(&valid.profile, valid.source);
            println!();
            print_record(&valid.record, &valid.profile);
        }
        Decoded::Empty(empty) => {
            println!("Module:          empty");
            print_profile(&empty.profile, empty.source);
            println!();
            println!("The module holds no data yet. Use `fd44 write` to fill it.");
        }
        Decoded::PartiallyResolved(partial) => {
            println!("Module:          empty, {} version", partial.variant);
            println!("Profile:         board not in the profile table");
            println!();
            println!("Before writing, choose:");
            if partial.undecided.contains(Undecided::ADDRESS_STORAGE) {
                println!("  --address-storage   where the hardware address is stored");
            }
            if partial.undecided.contains(Undecided::SENSOR_KEY) {
                println!("  --key-layout        sensor-key record layout");
            }
        }
    }
}

fn print_image_info(info: &ImageInfo) {
    let identity = &info.identity;
    println!("Firmware Image");
    println!("==============");
    println!();
    println!("Board:           {}", identity.name());
    println!("BIOS version:    {}", identity.version_string());
    println!("BIOS date:       {}", identity.firmware_date);
    if let Some(name) = &identity.recovery_name {
        println!("Recovery name:   {}", name);
    }
    if info.flashback_capsule {
        println!("Format:          USB BIOS Flashback capsule");
    }

    match &info.management_engine {
        Some(me) => match me.version {
            Some(version) => println!("ME firmware:     {} ({})", version, me.variant),
            None => println!("ME firmware:     present, version unknown ({})", me.variant),
        },
        None => println!("ME firmware:     absent (BIOS-only image)"),
    }

    match &info.network_region {
        Some(gbe) => {
            let version = gbe
                .version
                .map_or_else(|| "unknown".to_string(), |v| v.to_string());
            println!("GbE region:      0x{:08X}, version {}", gbe.offset, version);
        }
        None => println!("GbE region:      absent"),
    }
}

fn print_profile(profile: &BoardProfile, source: ProfileSource) {
    let source = match source {
        ProfileSource::Database => "profile table",
        ProfileSource::Detected => "detected from module",
        ProfileSource::Caller => "caller choice",
    };
    println!("Layout source:   {}", source);
    println!("Module version:  {}", profile.variant);
    println!("Address storage: {}", profile.hardware_address.describe());
    let key = match profile.sensor_key {
        SensorKeyLayout::None => "none".to_string(),
        SensorKeyLayout::Short => "short".to_string(),
        SensorKeyLayout::Long { magic } => format!("long ({:?} magic)", magic),
    };
    println!("Sensor key:      {}", key);
}

fn print_record(record: &ModuleRecord, profile: &BoardProfile) {
    println!("Identity Fields");
    println!("---------------");

    match record.hardware_address {
        Some(mac) if record.address_substituted => {
            println!("MAC address:     {} (taken from UUID tail)", mac)
        }
        Some(mac) => println!("MAC address:     {}", mac),
        None => println!("MAC address:     not present"),
    }
    if let Some(magic) = record.address_magic {
        println!("MAC slot byte:   0x{:02X}", magic);
    }

    match (&record.sensor_key, profile.sensor_key) {
        (Some(key), _) => println!("Sensor key:      {}", key),
        (None, SensorKeyLayout::None) => {}
        (None, _) => println!("Sensor key:      missing"),
    }

    match &record.uuid {
        Some(uuid) => println!("UUID:            {}", uuid),
        None => println!("UUID:            not present"),
    }

    match &record.serial_number {
        Some(serial) => {
            let format = match serial.format() {
                SerialFormat::Factory => "factory",
                SerialFormat::Generic => "generic",
            };
            println!("Serial number:   {} ({})", serial, format);
        }
        None => println!("Serial number:   not present"),
    }
}
