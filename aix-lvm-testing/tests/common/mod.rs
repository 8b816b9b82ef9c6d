#![allow(dead_code)]

use aix_lvm_sys::{ConvergeOptions, Converger, Inspector, MembershipCheck};
use aix_lvm_testing::FakeAixHost;

pub fn converger(host: &FakeAixHost) -> Converger<&FakeAixHost> {
    Converger::new(Inspector::new(host))
}

pub fn dry_run(host: &FakeAixHost) -> Converger<&FakeAixHost> {
    converger(host).with_options(ConvergeOptions {
        dry_run: true,
        ..ConvergeOptions::default()
    })
}

pub fn by_vg_name(host: &FakeAixHost) -> Converger<&FakeAixHost> {
    converger(host).with_options(ConvergeOptions {
        membership: MembershipCheck::VgName,
        ..ConvergeOptions::default()
    })
}
