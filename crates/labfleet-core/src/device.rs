// ── Device addressing model ──
//
// Pure functions from a sequence number to everything derived from it:
// management interface, hostname, switch group, core-router group and the
// cosmetic grid position under the switch. Devices are recomputed on every
// run and never persisted.

use std::fmt;
use std::net::Ipv4Addr;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Name prefix shared by every access switch (`Switch{group}`).
pub const SWITCH_NAME_PREFIX: &str = "Switch";

/// Name prefix shared by every core router (`CORE{n}`).
pub const CORE_ROUTER_NAME_PREFIX: &str = "CORE";

// ── Layout constants ─────────────────────────────────────────────────

/// How devices are partitioned into switch groups and core-router groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FleetLayout {
    devices_per_switch: u32,
    switches_per_core_router: u32,
}

impl Default for FleetLayout {
    fn default() -> Self {
        Self {
            devices_per_switch: 50,
            switches_per_core_router: 100,
        }
    }
}

impl FleetLayout {
    pub fn new(devices_per_switch: u32, switches_per_core_router: u32) -> Result<Self, CoreError> {
        if devices_per_switch == 0 {
            return Err(CoreError::InvalidLayout {
                field: "devices_per_switch",
                reason: "must be at least 1".into(),
            });
        }
        if switches_per_core_router == 0 {
            return Err(CoreError::InvalidLayout {
                field: "switches_per_core_router",
                reason: "must be at least 1".into(),
            });
        }
        Ok(Self {
            devices_per_switch,
            switches_per_core_router,
        })
    }

    pub fn devices_per_switch(&self) -> u32 {
        self.devices_per_switch
    }

    pub fn switches_per_core_router(&self) -> u32 {
        self.switches_per_core_router
    }
}

/// Visual placement of routers under their switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    devices_per_row: u32,
    spacing: i32,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            devices_per_row: 10,
            spacing: 85,
        }
    }
}

impl GridLayout {
    pub fn new(devices_per_row: u32, spacing: i32) -> Result<Self, CoreError> {
        if devices_per_row == 0 {
            return Err(CoreError::InvalidLayout {
                field: "devices_per_row",
                reason: "must be at least 1".into(),
            });
        }
        Ok(Self {
            devices_per_row,
            spacing,
        })
    }

    pub fn devices_per_row(&self) -> u32 {
        self.devices_per_row
    }

    pub fn spacing(&self) -> i32 {
        self.spacing
    }
}

/// Canvas coordinates on the controller's topology view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

// ── Management addressing ────────────────────────────────────────────

/// Addressing plan `{first}.{second}.{group}.{num_in_group}/{prefix_len}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagementScheme {
    pub first_octet: u8,
    pub second_octet: u8,
    pub prefix_len: u8,
}

impl Default for ManagementScheme {
    fn default() -> Self {
        Self {
            first_octet: 10,
            second_octet: 15,
            prefix_len: 24,
        }
    }
}

impl ManagementScheme {
    fn interface(&self, sequence_number: u32, group: u32, num_in_group: u32) -> Result<ManagementInterface, CoreError> {
        let overflow = |what: &str, value: u32| CoreError::AddressOverflow {
            sequence_number,
            reason: format!("{what} {value} does not fit in an IPv4 octet"),
        };
        let third = u8::try_from(group).map_err(|_| overflow("group", group))?;
        let fourth = u8::try_from(num_in_group).map_err(|_| overflow("position in group", num_in_group))?;
        if self.prefix_len > 32 {
            return Err(CoreError::InvalidLayout {
                field: "prefix_len",
                reason: format!("{} is not a valid IPv4 prefix length", self.prefix_len),
            });
        }
        Ok(ManagementInterface {
            address: Ipv4Addr::new(self.first_octet, self.second_octet, third, fourth),
            prefix_len: self.prefix_len,
        })
    }
}

/// An IPv4 address with its prefix length, e.g. `10.15.2.1/24`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ManagementInterface {
    address: Ipv4Addr,
    prefix_len: u8,
}

impl ManagementInterface {
    pub fn address(&self) -> Ipv4Addr {
        self.address
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    pub fn netmask(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.mask_bits())
    }

    pub fn network_address(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.address) & self.mask_bits())
    }

    pub fn broadcast_address(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.network_address()) | !self.mask_bits())
    }

    /// Last usable host of the network, used as the default gateway.
    pub fn last_host(&self) -> Ipv4Addr {
        let broadcast = u32::from(self.broadcast_address());
        if self.prefix_len >= 31 {
            Ipv4Addr::from(broadcast)
        } else {
            Ipv4Addr::from(broadcast - 1)
        }
    }

    fn mask_bits(&self) -> u32 {
        u32::MAX.checked_shl(32 - u32::from(self.prefix_len)).unwrap_or(0)
    }
}

impl fmt::Display for ManagementInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len)
    }
}

// ── Device ───────────────────────────────────────────────────────────

/// A simulated router derived from its sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    sequence_number: u32,
    management: ManagementInterface,
    hostname: String,
    host: Option<String>,
    layout: FleetLayout,
}

impl Device {
    /// Derive a device from its 1-based sequence number.
    pub fn from_sequence_number(
        sequence_number: u32,
        layout: FleetLayout,
        scheme: &ManagementScheme,
    ) -> Result<Self, CoreError> {
        if sequence_number < 1 {
            return Err(CoreError::InvalidSequenceNumber {
                value: sequence_number,
            });
        }
        let group = group_of(sequence_number, layout.devices_per_switch);
        let num_in_group = (sequence_number - 1) % layout.devices_per_switch + 1;
        let management = scheme.interface(sequence_number, group, num_in_group)?;

        Ok(Self {
            sequence_number,
            management,
            hostname: sequence_number.to_string(),
            host: None,
            layout,
        })
    }

    /// Override the hostname (defaults to the sequence number).
    #[must_use]
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    /// Override the address tools connect to (defaults to the management IP).
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    /// Inventory name: always the stringified sequence number.
    pub fn name(&self) -> String {
        self.sequence_number.to_string()
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Address configuration-management tools should connect to.
    pub fn host(&self) -> String {
        self.host
            .clone()
            .unwrap_or_else(|| self.management.address().to_string())
    }

    pub fn management(&self) -> &ManagementInterface {
        &self.management
    }

    pub fn management_ip(&self) -> Ipv4Addr {
        self.management.address()
    }

    pub fn default_gateway(&self) -> Ipv4Addr {
        self.management.last_host()
    }

    pub fn layout(&self) -> FleetLayout {
        self.layout
    }

    /// `ceil(sequence_number / devices_per_switch)`
    pub fn group_number(&self) -> u32 {
        group_of(self.sequence_number, self.layout.devices_per_switch)
    }

    /// 1-based position within the switch group; doubles as the switch port.
    pub fn sequence_in_group(&self) -> u32 {
        (self.sequence_number - 1) % self.layout.devices_per_switch + 1
    }

    pub fn core_router_number(&self) -> u32 {
        group_of(self.group_number(), self.layout.switches_per_core_router)
    }

    pub fn connected_switch(&self) -> String {
        format!("{SWITCH_NAME_PREFIX}{}", self.group_number())
    }

    pub fn connected_core_router(&self) -> String {
        format!("{CORE_ROUTER_NAME_PREFIX}{}", self.core_router_number())
    }

    /// Canvas position in rows under the switch anchored at `anchor`.
    ///
    /// `row = seq_in_group / row_size`,
    /// `column_offset = seq_in_group % row_size - row_size / 2`,
    /// position = anchor + (column_offset * spacing, -(total_rows - row) * spacing),
    /// with `seq_in_group` 0-based.
    pub fn position_in_group_grid(&self, anchor: Position, grid: &GridLayout) -> Position {
        let row_size = i64::from(grid.devices_per_row);
        let spacing = i64::from(grid.spacing);
        let seq = i64::from(self.sequence_in_group() - 1);
        let total_rows = i64::from(self.layout.devices_per_switch) / row_size;

        let row = seq / row_size;
        let column_offset = seq % row_size - row_size / 2;

        Position {
            x: saturate(i64::from(anchor.x) + column_offset * spacing),
            y: saturate(i64::from(anchor.y) - (total_rows - row) * spacing),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.hostname, self.management)
    }
}

/// Build the dense device set for `range`.
pub fn fleet(
    range: RangeInclusive<u32>,
    layout: FleetLayout,
    scheme: &ManagementScheme,
) -> Result<Vec<Device>, CoreError> {
    range
        .map(|n| Device::from_sequence_number(n, layout, scheme))
        .collect()
}

fn group_of(n: u32, size: u32) -> u32 {
    (n - 1) / size + 1
}

fn saturate(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}
