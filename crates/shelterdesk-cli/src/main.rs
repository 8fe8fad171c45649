//! `shelterdesk` — command-line client for the shelterdesk API.
//!
//! # Usage
//!
//! ```
//! shelterdesk --url http://localhost:8080 --user admin --password secret people list
//! shelterdesk --config ~/.config/shelterdesk/config.toml move <FROM> <SHELTER> <TO>
//! shelterdesk seed demo.toml
//! ```

mod client;
mod seed;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use serde::{Deserialize, Serialize};
use shelterdesk_core::{
  assignment::{AssignRequest, MoveRequest, UnassignRequest},
  pagela::NewPagela,
  person::{NewPerson, PersonUpdate, Role},
  profile::ProfileKind,
  shelter::{Address, NewShelter, ShelterView},
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "shelterdesk", about = "Command-line client for the shelterdesk API")]
struct Args {
  /// Path to a TOML config file (url, username, password).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the shelterdesk server (default: http://localhost:8080).
  #[arg(long, env = "SHELTERDESK_URL")]
  url: Option<String>,

  /// API username.
  #[arg(long, env = "SHELTERDESK_USER")]
  user: Option<String>,

  /// API password (plaintext).
  #[arg(long, env = "SHELTERDESK_PASSWORD")]
  password: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Register, list, and promote people.
  People {
    #[command(subcommand)]
    cmd: PeopleCmd,
  },
  /// Create and inspect shelters.
  Shelters {
    #[command(subcommand)]
    cmd: ShelterCmd,
  },
  /// List leader and teacher profiles.
  Profiles {
    #[arg(long)]
    kind:    Option<ProfileKind>,
    #[arg(long)]
    shelter: Option<Uuid>,
  },
  /// Link a profile to a shelter.
  Assign {
    profile: Uuid,
    shelter: Uuid,
    /// Replace an existing link to a different shelter.
    #[arg(long)]
    force:   bool,
  },
  /// Clear a profile's link to a shelter.
  Unassign { profile: Uuid, shelter: Uuid },
  /// Hand a shelter over from one profile to another in one step.
  Move { from: Uuid, shelter: Uuid, to: Uuid },
  /// Record and list pagelas.
  Pagela {
    #[command(subcommand)]
    cmd: PagelaCmd,
  },
  /// Create people, shelters, and assignments from a TOML file.
  Seed { file: PathBuf },
}

#[derive(Subcommand, Debug)]
enum PeopleCmd {
  List {
    #[arg(long)]
    role: Option<Role>,
  },
  Register {
    name:  String,
    #[arg(long)]
    role:  Role,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
  },
  /// Complete or correct contact fields.
  Update {
    id:    Uuid,
    #[arg(long)]
    name:  Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
  },
  Promote {
    id:   Uuid,
    #[arg(long)]
    kind: ProfileKind,
  },
}

#[derive(Subcommand, Debug)]
enum ShelterCmd {
  List,
  Show { id: Uuid },
  Create {
    name:        String,
    #[arg(long)]
    street:      String,
    #[arg(long)]
    number:      String,
    #[arg(long)]
    district:    String,
    #[arg(long)]
    city:        String,
    #[arg(long)]
    state:       String,
    #[arg(long)]
    postal_code: String,
    #[arg(long)]
    complement:  Option<String>,
  },
}

#[derive(Subcommand, Debug)]
enum PagelaCmd {
  Record {
    person:  Uuid,
    /// Reference date, `YYYY-MM-DD`.
    #[arg(long)]
    date:    NaiveDate,
    #[arg(long)]
    absent:  bool,
    #[arg(long)]
    shelter: Option<Uuid>,
    #[arg(long)]
    notes:   Option<String>,
  },
  List { person: Uuid },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:      String,
  #[serde(default)]
  username: String,
  #[serde(default)]
  password: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:8080".to_string()),
    username: args
      .user
      .or_else(|| (!file_cfg.username.is_empty()).then(|| file_cfg.username.clone()))
      .unwrap_or_default(),
    password: args
      .password
      .or_else(|| (!file_cfg.password.is_empty()).then(|| file_cfg.password.clone()))
      .unwrap_or_default(),
  };

  let client = ApiClient::new(api_config)?;
  run(&client, args.command).await
}

async fn run(client: &ApiClient, command: Command) -> Result<()> {
  match command {
    Command::People { cmd } => people(client, cmd).await,
    Command::Shelters { cmd } => shelters(client, cmd).await,
    Command::Profiles { kind, shelter } => {
      for p in client.list_profiles(kind, shelter).await? {
        let linked = p.shelter_id.map_or_else(|| "-".to_string(), |id| id.to_string());
        println!("{}  {:<7}  person {}  shelter {linked}", p.profile_id, p.kind.as_str(), p.person_id);
      }
      Ok(())
    }
    Command::Assign { profile, shelter, force } => {
      let linkage = client
        .assign(AssignRequest { profile_id: profile, shelter_id: shelter, force })
        .await?;
      print_json(&linkage)
    }
    Command::Unassign { profile, shelter } => {
      let linkage = client
        .unassign(UnassignRequest { profile_id: profile, shelter_id: shelter })
        .await?;
      print_json(&linkage)
    }
    Command::Move { from, shelter, to } => {
      let moved = client
        .move_shelter(MoveRequest { from_profile_id: from, shelter_id: shelter, to_profile_id: to })
        .await?;
      print_json(&moved)
    }
    Command::Pagela { cmd } => pagelas(client, cmd).await,
    Command::Seed { file } => {
      let raw = std::fs::read_to_string(&file)
        .with_context(|| format!("reading seed file {}", file.display()))?;
      let report = seed::SeedFile::parse(&raw)?.apply(client).await?;
      println!(
        "seeded {} people, {} profiles, {} shelters, {} assignments",
        report.people, report.profiles, report.shelters, report.assignments
      );
      Ok(())
    }
  }
}

async fn people(client: &ApiClient, cmd: PeopleCmd) -> Result<()> {
  match cmd {
    PeopleCmd::List { role } => {
      for p in client.list_people(role).await? {
        println!("{}  {:<9}  {}", p.person_id, p.role.as_str(), p.name);
      }
      Ok(())
    }
    PeopleCmd::Register { name, role, email, phone } => {
      let person = client.register(&NewPerson { name, email, phone, role }).await?;
      print_json(&person)
    }
    PeopleCmd::Update { id, name, email, phone } => {
      let person = client.update_person(id, &PersonUpdate { name, email, phone }).await?;
      print_json(&person)
    }
    PeopleCmd::Promote { id, kind } => print_json(&client.promote(id, kind).await?),
  }
}

async fn shelters(client: &ApiClient, cmd: ShelterCmd) -> Result<()> {
  match cmd {
    ShelterCmd::List => {
      for view in client.list_shelters().await? {
        print_shelter_line(&view);
      }
      Ok(())
    }
    ShelterCmd::Show { id } => print_json(&client.get_shelter(id).await?),
    ShelterCmd::Create {
      name,
      street,
      number,
      district,
      city,
      state,
      postal_code,
      complement,
    } => {
      let shelter = client
        .create_shelter(&NewShelter {
          name,
          address: Address { street, number, district, city, state, postal_code, complement },
        })
        .await?;
      print_json(&shelter)
    }
  }
}

async fn pagelas(client: &ApiClient, cmd: PagelaCmd) -> Result<()> {
  match cmd {
    PagelaCmd::Record { person, date, absent, shelter, notes } => {
      let pagela = client
        .record_pagela(&NewPagela {
          person_id: person,
          shelter_id: shelter,
          reference_date: date,
          present: !absent,
          notes,
        })
        .await?;
      print_json(&pagela)
    }
    PagelaCmd::List { person } => {
      for p in client.list_pagelas(person).await? {
        let mark = if p.present { "present" } else { "absent" };
        println!("{}  {mark:<7}  {}", p.reference_date, p.notes.unwrap_or_default());
      }
      Ok(())
    }
  }
}

// ─── Output ───────────────────────────────────────────────────────────────────

fn print_json<T: Serialize>(value: &T) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

fn print_shelter_line(view: &ShelterView) {
  println!(
    "{}  {}  ({}, {})  leaders: {}  teachers: {}",
    view.shelter.shelter_id,
    view.shelter.name,
    view.shelter.address.city,
    view.shelter.address.state,
    view.leaders.len(),
    view.teachers.len(),
  );
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn role_and_kind_flags_use_wire_names() {
    let args = Args::try_parse_from(["shelterdesk", "people", "list", "--role", "sheltered"]).unwrap();
    assert!(matches!(args.command, Command::People { cmd: PeopleCmd::List { role: Some(Role::Sheltered) } }));

    let id = Uuid::new_v4().to_string();
    let args =
      Args::try_parse_from(["shelterdesk", "people", "promote", &id, "--kind", "teacher"]).unwrap();
    assert!(matches!(
      args.command,
      Command::People { cmd: PeopleCmd::Promote { kind: ProfileKind::Teacher, .. } }
    ));
  }

  #[test]
  fn unknown_role_is_rejected_with_choices() {
    let err = Args::try_parse_from(["shelterdesk", "people", "list", "--role", "visitor"]).unwrap_err();
    assert!(err.to_string().contains("leader, teacher"), "{err}");
  }
}
