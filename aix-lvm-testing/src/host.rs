//! Simulated AIX host
//!
//! [`FakeAixHost`] answers the LVM commands the engine uses from an in-memory
//! disk table and records every command line it receives. `mkvg` and
//! `extendvg` really change that table, so repeated runs observe the effect of
//! earlier ones.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use aix_lvm_sys::{CommandOutput, CommandRunner, Result, SysError, render};

const MUTATING: [&str; 2] = ["mkvg", "extendvg"];

#[derive(Debug, Clone)]
struct Disk {
    name: String,
    pvid: Option<String>,
    volume_group: Option<String>,
}

#[derive(Debug, Default)]
struct HostState {
    disks: Vec<Disk>,
    /// Volume group name to VGID
    groups: BTreeMap<String, String>,
    next_id: u64,
    short_vgda_ids: bool,
}

impl HostState {
    fn next_pvid(&mut self) -> String {
        self.next_id += 1;
        format!("00f6f5d0{:08x}", self.next_id)
    }

    fn next_vgid(&mut self) -> String {
        self.next_id += 1;
        format!("00f6f5d000004c00{:016x}", self.next_id)
    }

    fn disk(&self, name: &str) -> Option<&Disk> {
        self.disks.iter().find(|disk| disk.name == name)
    }

    fn ensure_disk(&mut self, name: &str) {
        if self.disk(name).is_none() {
            self.disks.push(Disk {
                name: name.to_string(),
                pvid: None,
                volume_group: None,
            });
        }
    }

    fn assign(&mut self, name: &str, volume_group: &str) {
        let pvid = self.next_pvid();
        if let Some(disk) = self.disks.iter_mut().find(|disk| disk.name == name) {
            disk.pvid.get_or_insert(pvid);
            disk.volume_group = Some(volume_group.to_string());
        }
    }

    /// Check that every device exists and is free, before touching anything
    fn check_free(&self, command: &str, devices: &[String]) -> Option<CommandOutput> {
        for device in devices {
            match self.disk(device) {
                None => {
                    return Some(CommandOutput::failed(
                        1,
                        format!("0516-1104 {command}: Unable to find physical volume {device}."),
                    ));
                }
                Some(Disk {
                    volume_group: Some(owner),
                    ..
                }) => {
                    return Some(CommandOutput::failed(
                        1,
                        format!(
                            "0516-1254 {command}: Physical volume {device} belongs to volume group {owner}."
                        ),
                    ));
                }
                Some(_) => {}
            }
        }
        None
    }
}

/// In-memory AIX host for exercising the engine without real disks
#[derive(Debug, Default)]
pub struct FakeAixHost {
    state: RefCell<HostState>,
    commands: RefCell<Vec<String>>,
    failing: RefCell<BTreeSet<String>>,
    garbled: RefCell<BTreeSet<String>>,
}

impl FakeAixHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an unassigned disk
    pub fn with_disk(mut self, name: &str) -> Self {
        self.state.get_mut().ensure_disk(name);
        self
    }

    pub fn with_disks(mut self, names: &[&str]) -> Self {
        for name in names {
            self.state.get_mut().ensure_disk(name);
        }
        self
    }

    /// Add a volume group built from `disks`, creating the disks as needed
    pub fn with_volume_group(mut self, name: &str, disks: &[&str]) -> Self {
        let state = self.state.get_mut();
        let vgid = state.next_vgid();
        state.groups.insert(name.to_string(), vgid);
        for disk in disks {
            state.ensure_disk(disk);
            state.assign(disk, name);
        }
        self
    }

    /// Make `readvgda` print the 16-character VGID form while `getlvodm`
    /// keeps printing all 32 characters
    pub fn with_short_vgda_ids(mut self) -> Self {
        self.state.get_mut().short_vgda_ids = true;
        self
    }

    /// Make every later run of `program` exit with status 1
    pub fn fail_command(&self, program: &str) {
        self.failing.borrow_mut().insert(program.to_string());
    }

    /// Make every later run of `program` exit zero with output no parser
    /// recognizes
    pub fn garble_output(&self, program: &str) {
        self.garbled.borrow_mut().insert(program.to_string());
    }

    /// Every command line received so far
    pub fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }

    /// Received `mkvg` and `extendvg` command lines
    pub fn mutations(&self) -> Vec<String> {
        self.commands
            .borrow()
            .iter()
            .filter(|command| {
                command
                    .split_whitespace()
                    .next()
                    .is_some_and(|program| MUTATING.contains(&program_name(program)))
            })
            .cloned()
            .collect()
    }

    pub fn clear_commands(&self) {
        self.commands.borrow_mut().clear();
    }

    pub fn has_volume_group(&self, name: &str) -> bool {
        self.state.borrow().groups.contains_key(name)
    }

    /// Member disks of a volume group, in disk table order
    pub fn members(&self, volume_group: &str) -> Vec<String> {
        self.state
            .borrow()
            .disks
            .iter()
            .filter(|disk| disk.volume_group.as_deref() == Some(volume_group))
            .map(|disk| disk.name.clone())
            .collect()
    }

    fn lspv(&self) -> CommandOutput {
        let state = self.state.borrow();
        let mut stdout = String::new();
        for disk in &state.disks {
            let line = format!(
                "{:<16}{:<36}{:<16}{}",
                disk.name,
                disk.pvid.as_deref().unwrap_or("none"),
                disk.volume_group.as_deref().unwrap_or("None"),
                if disk.volume_group.is_some() { "active" } else { "" },
            );
            stdout.push_str(line.trim_end());
            stdout.push('\n');
        }
        CommandOutput::ok(stdout)
    }

    fn lsvg(&self, args: &[String]) -> CommandOutput {
        let state = self.state.borrow();
        let Some(name) = args.first() else {
            let names: Vec<&str> = state.groups.keys().map(String::as_str).collect();
            return CommandOutput::ok(format!("{}\n", names.join("\n")));
        };
        match state.groups.get(name) {
            Some(vgid) => CommandOutput::ok(format!(
                "VOLUME GROUP:       {name:<24}VG IDENTIFIER:  {vgid}\nVG STATE:           active\n"
            )),
            None => CommandOutput::failed(
                1,
                format!(
                    "0516-306 lsvg: Unable to find volume group {name} in the Device\n\tConfiguration Database.\n"
                ),
            ),
        }
    }

    fn readvgda(&self, args: &[String]) -> CommandOutput {
        let state = self.state.borrow();
        let device = args.iter().find(|arg| !arg.starts_with('-'));
        let disk = device.and_then(|device| state.disk(device));
        let Some(Disk {
            pvid: Some(pvid),
            volume_group: Some(volume_group),
            ..
        }) = disk
        else {
            return CommandOutput::failed(1, "0516-024 readvgda: Unable to read the VGDA.\n");
        };

        let vgid = state.groups.get(volume_group).cloned().unwrap_or_default();
        let vgid = if state.short_vgda_ids {
            vgid.chars().take(16).collect::<String>()
        } else {
            vgid
        };
        CommandOutput::ok(format!("PVID: {pvid}\nVGID: {vgid}\nNUM_LVS: 0\n"))
    }

    fn getlvodm(&self, args: &[String]) -> CommandOutput {
        let state = self.state.borrow();
        let name = args.iter().find(|arg| !arg.starts_with('-'));
        match name.and_then(|name| state.groups.get(name)) {
            Some(vgid) => CommandOutput::ok(format!("{vgid}\n")),
            None => CommandOutput::failed(1, "0516-306 getlvodm: Unable to find volume group.\n"),
        }
    }

    fn mkvg(&self, args: &[String]) -> CommandOutput {
        let mut name = None;
        let mut devices = Vec::new();
        let mut args = args.iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-f" => {}
                "-s" => {
                    args.next();
                }
                "-y" => name = args.next().cloned(),
                device => devices.push(device.to_string()),
            }
        }

        let Some(name) = name else {
            return CommandOutput::failed(1, "Usage: mkvg [-f] [-s Size] -y VGname PVname...\n");
        };
        if devices.is_empty() {
            return CommandOutput::failed(1, "Usage: mkvg [-f] [-s Size] -y VGname PVname...\n");
        }

        let mut state = self.state.borrow_mut();
        if state.groups.contains_key(&name) {
            return CommandOutput::failed(
                1,
                format!("0516-1184 mkvg: Volume group {name} already exists.\n"),
            );
        }
        if let Some(failure) = state.check_free("mkvg", &devices) {
            return failure;
        }

        let vgid = state.next_vgid();
        state.groups.insert(name.clone(), vgid);
        for device in &devices {
            state.assign(device, &name);
        }
        CommandOutput::ok(format!("{name}\n"))
    }

    fn extendvg(&self, args: &[String]) -> CommandOutput {
        let Some((name, devices)) = args.split_first() else {
            return CommandOutput::failed(1, "Usage: extendvg [-f] VGname PVname...\n");
        };
        if devices.is_empty() {
            return CommandOutput::failed(1, "Usage: extendvg [-f] VGname PVname...\n");
        }

        let mut state = self.state.borrow_mut();
        if !state.groups.contains_key(name) {
            return CommandOutput::failed(
                1,
                format!("0516-306 extendvg: Unable to find volume group {name}.\n"),
            );
        }
        let unique: Vec<String> = devices
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if let Some(failure) = state.check_free("extendvg", &unique) {
            return failure;
        }

        for device in &unique {
            state.assign(device, name);
        }
        CommandOutput::ok("")
    }
}

fn program_name(program: &str) -> &str {
    Path::new(program)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(program)
}

impl CommandRunner for FakeAixHost {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        self.commands.borrow_mut().push(render(program, args));

        let name = program_name(program);
        if self.failing.borrow().contains(name) {
            return Ok(CommandOutput::failed(1, format!("{name}: simulated failure\n")));
        }
        if self.garbled.borrow().contains(name) {
            return Ok(CommandOutput::ok(format!("{name}: ###\n")));
        }

        let output = match name {
            "lspv" => self.lspv(),
            "lsvg" => self.lsvg(args),
            "readvgda" => self.readvgda(args),
            "getlvodm" => self.getlvodm(args),
            "mkvg" => self.mkvg(args),
            "extendvg" => self.extendvg(args),
            _ => return Err(SysError::CommandNotFound(program.to_string())),
        };
        Ok(output)
    }
}
