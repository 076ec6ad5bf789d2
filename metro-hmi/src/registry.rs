/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Physical controller registry.
//!
//! Controllers come in trios.  The first controller of a trio is the
//! *source*: the data-acquisition layer exposes one flat register/coil
//! address space per source, and every controller of the trio (the source
//! included) owns a window of it.
//!
//! ```text
//!   PLC-00 ──┬── PLC-00  registers [0, 15)   coils [0, 7)
//!            ├── PLC-01  registers [15, 30)  coils [7, 14)
//!            └── PLC-02  registers [30, 39)  coils [14, 19)
//!   PLC-03 ──┬── PLC-03  registers [0, 8)    coils [0, 8)
//!            ├── PLC-04  registers [8, 16)   coils [8, 16)
//!            └── PLC-05  registers [16, 22)  coils [16, 22)
//! ```

use std::collections::HashSet;

use serde::Deserialize;
use tracing::warn;

use crate::config::ConfigError;
use crate::topology::{IndexRange, LineId};

// ── Controller metadata ───────────────────────────────────────────────────────

/// What a controller's windows carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerRole {
    /// Junction sensors and signals.
    Junction,
    /// Station platform sensors and signals.
    Station,
}

/// A named digital input or output shown on a controller's panel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IoPoint {
    pub name: String,
    /// Line the point belongs to; decides the label colour.
    pub line: LineId,
}

/// Network identity and owned index windows of one controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerInfo {
    /// Stable id, e.g. `"PLC-00"`.
    pub id: String,
    pub label: String,
    pub address: String,
    pub port: u16,
    pub role: ControllerRole,

    /// Controller whose address space the windows index into.  Equal to `id`
    /// for the head of a trio.
    pub source: String,

    /// Owned holding-register window in the source's address space.
    pub register_window: IndexRange,
    /// Owned coil window in the source's address space.
    pub coil_window: IndexRange,

    /// One label per owned register (digital inputs).
    pub inputs: Vec<IoPoint>,
    /// One label per owned coil (digital outputs).
    pub outputs: Vec<IoPoint>,
}

impl ControllerInfo {
    /// `address:port`, as shown on the panel header.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }

    /// `true` for the head of a trio.
    pub fn is_source(&self) -> bool {
        self.source == self.id
    }
}

// ── ControllerRegistry ────────────────────────────────────────────────────────

/// Validated, read-only list of controllers in declaration order.
#[derive(Debug, Clone)]
pub struct ControllerRegistry {
    controllers: Vec<ControllerInfo>,
}

impl ControllerRegistry {
    /// Builds the registry, keeping declaration order.
    ///
    /// # Errors
    /// * [`ConfigError::EmptyRegistry`] for an empty list.
    /// * [`ConfigError::DuplicateController`] for a repeated id.
    /// * [`ConfigError::InvalidRange`] for a window with `start > end`.
    /// * [`ConfigError::UnknownController`] / [`ConfigError::NotASourceController`]
    ///   when `source` does not name a registered trio head.
    pub fn new(controllers: Vec<ControllerInfo>) -> Result<Self, ConfigError> {
        if controllers.is_empty() {
            return Err(ConfigError::EmptyRegistry);
        }

        let mut seen = HashSet::new();
        for c in &controllers {
            if !seen.insert(c.id.as_str()) {
                return Err(ConfigError::DuplicateController(c.id.clone()));
            }
            c.register_window.check(&c.id, "register window")?;
            c.coil_window.check(&c.id, "coil window")?;
        }

        let registry = Self { controllers };
        for c in &registry.controllers {
            registry.check_source(&c.id, &c.source)?;

            // Label lists are display metadata: a mismatch is worth a warning
            // but must not stop the HMI.
            if !c.inputs.is_empty() && c.inputs.len() != c.register_window.len() {
                warn!(
                    controller = %c.id,
                    labels = c.inputs.len(),
                    window = c.register_window.len(),
                    "input label count does not match register window"
                );
            }
            if !c.outputs.is_empty() && c.outputs.len() != c.coil_window.len() {
                warn!(
                    controller = %c.id,
                    labels = c.outputs.len(),
                    window = c.coil_window.len(),
                    "output label count does not match coil window"
                );
            }
        }
        Ok(registry)
    }

    /// The six-controller reference topology shown in the module header.
    pub fn reference() -> Self {
        use ControllerRole::{Junction, Station};
        use LineId::{Ccline, Nsline, Weline};

        let controller = |id: &str,
                          port: u16,
                          role,
                          source: &str,
                          registers: IndexRange,
                          coils: IndexRange,
                          inputs: Vec<IoPoint>,
                          outputs: Vec<IoPoint>| ControllerInfo {
            id: id.to_string(),
            label: id.to_string(),
            address: String::from("127.0.0.1"),
            port,
            role,
            source: source.to_string(),
            register_window: registers,
            coil_window: coils,
            inputs,
            outputs,
        };

        Self {
            controllers: vec![
                controller(
                    "PLC-00",
                    502,
                    Junction,
                    "PLC-00",
                    IndexRange::new(0, 15),
                    IndexRange::new(0, 7),
                    points("wes", 0..15, Weline),
                    points("Swe", 0..7, Weline),
                ),
                controller(
                    "PLC-01",
                    503,
                    Junction,
                    "PLC-00",
                    IndexRange::new(15, 30),
                    IndexRange::new(7, 14),
                    [
                        points("wes", 15..17, Weline),
                        points("nss", 0..8, Nsline),
                        points("ccs", 0..5, Ccline),
                    ]
                    .concat(),
                    [
                        points("Swe", 7..8, Weline),
                        points("Sns", 0..4, Nsline),
                        points("Scc", 0..2, Ccline),
                    ]
                    .concat(),
                ),
                controller(
                    "PLC-02",
                    504,
                    Junction,
                    "PLC-00",
                    IndexRange::new(30, 39),
                    IndexRange::new(14, 19),
                    points("ccs", 5..14, Ccline),
                    points("Scc", 2..7, Ccline),
                ),
                controller(
                    "PLC-03",
                    505,
                    Station,
                    "PLC-03",
                    IndexRange::new(0, 8),
                    IndexRange::new(0, 8),
                    points("west", 0..8, Weline),
                    points("STwe", 0..8, Weline),
                ),
                controller(
                    "PLC-04",
                    506,
                    Station,
                    "PLC-03",
                    IndexRange::new(8, 16),
                    IndexRange::new(8, 16),
                    [points("west", 8..10, Weline), points("nsst", 0..6, Nsline)].concat(),
                    [points("STwe", 8..10, Weline), points("STns", 0..6, Nsline)].concat(),
                ),
                controller(
                    "PLC-05",
                    507,
                    Station,
                    "PLC-03",
                    IndexRange::new(16, 22),
                    IndexRange::new(16, 22),
                    points("ccst", 0..6, Ccline),
                    points("STcc", 0..6, Ccline),
                ),
            ],
        }
    }

    /// Looks a controller up by id.
    ///
    /// # Errors
    /// [`ConfigError::UnknownController`] if no controller has this id.
    pub fn get(&self, id: &str) -> Result<&ControllerInfo, ConfigError> {
        self.controllers
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| ConfigError::UnknownController(id.to_string()))
    }

    /// All controllers in declaration order.
    pub fn list(&self) -> &[ControllerInfo] {
        &self.controllers
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    /// `source_id` must name a registered controller that is its own source.
    pub(crate) fn check_source(&self, owner: &str, source_id: &str) -> Result<(), ConfigError> {
        let source = self.get(source_id)?;
        if source.is_source() {
            Ok(())
        } else {
            Err(ConfigError::NotASourceController {
                owner: owner.to_string(),
                source_id: source_id.to_string(),
            })
        }
    }
}

/// `prefix00`, `prefix01`, … for every index in `range`.
fn points(prefix: &str, range: std::ops::Range<usize>, line: LineId) -> Vec<IoPoint> {
    range
        .map(|i| IoPoint {
            name: format!("{prefix}{i:02}"),
            line,
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_list() -> Vec<ControllerInfo> {
        ControllerRegistry::reference().list().to_vec()
    }

    // ── Reference registry ────────────────────────────────────────────────────

    #[test]
    fn reference_registry_passes_validation() {
        let reg = ControllerRegistry::new(reference_list()).unwrap();
        assert_eq!(reg.len(), 6);
    }

    #[test]
    fn list_keeps_declaration_order() {
        let ids: Vec<_> = ControllerRegistry::reference()
            .list()
            .iter()
            .map(|c| c.id.clone())
            .collect();
        assert_eq!(ids, ["PLC-00", "PLC-01", "PLC-02", "PLC-03", "PLC-04", "PLC-05"]);
    }

    #[test]
    fn reference_has_three_junction_and_three_station_controllers() {
        let reg = ControllerRegistry::reference();
        let junction = reg
            .list()
            .iter()
            .filter(|c| c.role == ControllerRole::Junction)
            .count();
        assert_eq!(junction, 3);
        assert_eq!(reg.len() - junction, 3);
    }

    #[test]
    fn sources_are_first_of_each_trio() {
        let reg = ControllerRegistry::reference();
        let heads: Vec<_> = reg
            .list()
            .iter()
            .filter(|c| c.is_source())
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(heads, ["PLC-00", "PLC-03"]);
    }

    #[test]
    fn reference_labels_match_window_lengths() {
        for c in ControllerRegistry::reference().list() {
            assert_eq!(c.inputs.len(), c.register_window.len(), "{}", c.id);
            assert_eq!(c.outputs.len(), c.coil_window.len(), "{}", c.id);
        }
    }

    #[test]
    fn reference_labels_are_numbered_per_line() {
        let reg = ControllerRegistry::reference();
        let plc01 = reg.get("PLC-01").unwrap();
        assert_eq!(plc01.inputs[0].name, "wes15");
        assert_eq!(plc01.inputs[2].name, "nss00");
        assert_eq!(plc01.inputs[2].line, LineId::Nsline);
        assert_eq!(plc01.outputs[0].name, "Swe07");
        assert_eq!(plc01.outputs.last().unwrap().name, "Scc01");
    }

    #[test]
    fn endpoint_joins_address_and_port() {
        let reg = ControllerRegistry::reference();
        assert_eq!(reg.get("PLC-03").unwrap().endpoint(), "127.0.0.1:505");
    }

    // ── Lookups ───────────────────────────────────────────────────────────────

    #[test]
    fn get_unknown_controller_is_config_error() {
        let reg = ControllerRegistry::reference();
        assert_eq!(
            reg.get("PLC-99").unwrap_err(),
            ConfigError::UnknownController("PLC-99".into())
        );
    }

    // ── Validation failures ───────────────────────────────────────────────────

    #[test]
    fn empty_registry_is_rejected() {
        assert_eq!(
            ControllerRegistry::new(Vec::new()).unwrap_err(),
            ConfigError::EmptyRegistry
        );
    }

    #[test]
    fn duplicate_controller_is_rejected() {
        let mut list = reference_list();
        list.push(list[2].clone());
        assert_eq!(
            ControllerRegistry::new(list).unwrap_err(),
            ConfigError::DuplicateController("PLC-02".into())
        );
    }

    #[test]
    fn inverted_window_is_rejected() {
        let mut list = reference_list();
        list[4].coil_window = IndexRange::new(16, 8);
        assert!(matches!(
            ControllerRegistry::new(list).unwrap_err(),
            ConfigError::InvalidRange { field: "coil window", .. }
        ));
    }

    #[test]
    fn unknown_source_is_rejected() {
        let mut list = reference_list();
        list[1].source = "PLC-42".into();
        assert_eq!(
            ControllerRegistry::new(list).unwrap_err(),
            ConfigError::UnknownController("PLC-42".into())
        );
    }

    #[test]
    fn source_must_be_a_trio_head() {
        let mut list = reference_list();
        list[2].source = "PLC-01".into();
        assert_eq!(
            ControllerRegistry::new(list).unwrap_err(),
            ConfigError::NotASourceController {
                owner: "PLC-02".into(),
                source_id: "PLC-01".into(),
            }
        );
    }

    #[test]
    fn label_count_mismatch_is_only_a_warning() {
        let mut list = reference_list();
        list[0].inputs.pop();
        assert!(ControllerRegistry::new(list).is_ok());
    }
}
