//! CLI argument parsing

use clap::{Parser, Subcommand, ValueEnum};
use fd44_core::board::{AddressStorage, SensorKeyLayout};
use fd44_core::module::{AsciiMacHeader, LongKeyMagic, ModuleVariant};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fd44")]
#[command(author, version, about = "ASUS FD44 module identity editor", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Board database file (RON) extending the built-in board profiles
    #[arg(long, global = true)]
    pub board_db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Field edits shared by commands that write
#[derive(clap::Args, Debug, Clone, Default)]
pub struct EditArgs {
    /// Record file (TOML) with field values; flags below take precedence
    #[arg(long)]
    pub record: Option<PathBuf>,

    /// Hardware address, e.g. 00:11:22:33:44:55
    #[arg(long)]
    pub mac: Option<String>,

    /// System UUID, 32 hex digits with optional dashes
    #[arg(long)]
    pub uuid: Option<String>,

    /// Motherboard serial number, at most 16 characters
    #[arg(long)]
    pub serial: Option<String>,

    /// Sensor key, 16 hex digits
    #[arg(long)]
    pub sensor_key: Option<String>,
}

/// Layout choices for boards missing from the profile table
#[derive(clap::Args, Debug, Clone, Default)]
pub struct LayoutChoiceArgs {
    /// Where the hardware address is stored
    #[arg(long, value_enum)]
    pub address_storage: Option<StorageChoice>,

    /// Sensor-key record layout
    #[arg(long, value_enum)]
    pub key_layout: Option<KeyLayoutChoice>,
}

/// Address storage choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageChoice {
    /// Network controller region
    Network,
    /// Last six bytes of the UUID
    UuidTail,
    /// No hardware address
    None,
    /// ASCII text, 6-series Realtek header
    Ascii6,
    /// ASCII text, Z77 Realtek header
    AsciiZ77,
    /// ASCII text, B75 Realtek header
    AsciiB75,
    /// ASCII text, H77 Realtek header
    AsciiH77,
    /// ASCII text, H77 micro-ATX Realtek header
    AsciiH77m,
    /// ASCII text, H77 Atheros header
    AsciiAtheros,
}

impl From<StorageChoice> for AddressStorage {
    fn from(choice: StorageChoice) -> Self {
        let ascii = |header| AddressStorage::Ascii { header, magic: None };
        match choice {
            StorageChoice::Network => AddressStorage::NetworkRegion,
            StorageChoice::UuidTail => AddressStorage::UuidTail,
            StorageChoice::None => AddressStorage::NotPresent,
            StorageChoice::Ascii6 => ascii(AsciiMacHeader::SixSeries),
            StorageChoice::AsciiZ77 => ascii(AsciiMacHeader::Z77),
            StorageChoice::AsciiB75 => ascii(AsciiMacHeader::B75),
            StorageChoice::AsciiH77 => ascii(AsciiMacHeader::H77),
            StorageChoice::AsciiH77m => ascii(AsciiMacHeader::H77M),
            StorageChoice::AsciiAtheros => ascii(AsciiMacHeader::AtherosH77),
        }
    }
}

/// Sensor-key layout choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KeyLayoutChoice {
    /// No sensor-key record
    None,
    /// Short record (6-series only)
    Short,
    /// Long record, common magic block
    Long,
    /// Long record, P8P67-M PRO magic block
    LongV2,
    /// Long record, P8P67 WS REVOLUTION magic block
    LongV3,
}

impl From<KeyLayoutChoice> for SensorKeyLayout {
    fn from(choice: KeyLayoutChoice) -> Self {
        match choice {
            KeyLayoutChoice::None => SensorKeyLayout::None,
            KeyLayoutChoice::Short => SensorKeyLayout::Short,
            KeyLayoutChoice::Long => SensorKeyLayout::Long {
                magic: LongKeyMagic::V1,
            },
            KeyLayoutChoice::LongV2 => SensorKeyLayout::Long {
                magic: LongKeyMagic::V2,
            },
            KeyLayoutChoice::LongV3 => SensorKeyLayout::Long {
                magic: LongKeyMagic::V3,
            },
        }
    }
}

/// Module version filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VariantChoice {
    /// 6-series (P67, H67, Z68)
    SixSeries,
    /// C602 (X79)
    C602,
    /// 7-series (Z77, H77, B75)
    SevenSeries,
}

impl From<VariantChoice> for ModuleVariant {
    fn from(choice: VariantChoice) -> Self {
        match choice {
            VariantChoice::SixSeries => ModuleVariant::SixSeries,
            VariantChoice::C602 => ModuleVariant::C602,
            VariantChoice::SevenSeries => ModuleVariant::SevenSeries,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decode an image and show its identity fields
    Show {
        /// Firmware image
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Export the decoded fields to a record file (TOML)
    Export {
        /// Firmware image
        #[arg(short, long)]
        input: PathBuf,

        /// Output record file (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write identity fields into an image
    Write {
        /// Image the fields are read from
        #[arg(short, long)]
        input: PathBuf,

        /// Image the fields are written into (defaults to the input image)
        #[arg(short, long)]
        target: Option<PathBuf>,

        /// Output image path
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        edits: EditArgs,

        #[command(flatten)]
        layout: LayoutChoiceArgs,
    },

    /// List known board profiles
    Boards {
        /// Filter by module version
        #[arg(long, value_enum)]
        variant: Option<VariantChoice>,

        /// Filter by board name substring
        #[arg(long)]
        name: Option<String>,
    },
}
