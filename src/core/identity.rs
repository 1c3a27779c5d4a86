/*
 * Generates fresh telemetry identifier values. Each reset produces three
 * values: two 64-character lowercase hex machine ids, each derived from 32
 * independently drawn cryptographically random bytes, and one random
 * version-4 UUID device id. Nothing here depends on the clock, the process id,
 * or any other guessable source; the only effect of generation is entropy
 * consumption, so consecutive invocations are statistically independent.
 */
use rand::RngCore;
use uuid::Uuid;

pub const MACHINE_ID_KEY: &str = "telemetry.machineId";
pub const MAC_MACHINE_ID_KEY: &str = "telemetry.macMachineId";
pub const DEV_DEVICE_ID_KEY: &str = "telemetry.devDeviceId";

/// The three telemetry fields a reset regenerates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierSet {
    pub machine_id: String,
    pub mac_machine_id: String,
    pub dev_device_id: String,
}

impl IdentifierSet {
    /// Key/value view in the order the fields appear in the storage file.
    pub fn entries(&self) -> [(&'static str, &str); 3] {
        [
            (MACHINE_ID_KEY, self.machine_id.as_str()),
            (MAC_MACHINE_ID_KEY, self.mac_machine_id.as_str()),
            (DEV_DEVICE_ID_KEY, self.dev_device_id.as_str()),
        ]
    }
}

pub trait IdGeneratorOperations: Send + Sync {
    fn generate(&self) -> IdentifierSet;
}

pub struct CoreIdGenerator {}

impl CoreIdGenerator {
    pub fn new() -> Self {
        CoreIdGenerator {}
    }
}

impl Default for CoreIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGeneratorOperations for CoreIdGenerator {
    fn generate(&self) -> IdentifierSet {
        IdentifierSet {
            machine_id: random_hex_id(),
            mac_machine_id: random_hex_id(),
            dev_device_id: Uuid::new_v4().to_string(),
        }
    }
}

/// 32 random bytes from the thread-local CSPRNG, hex-encoded (64 chars).
fn random_hex_id() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_hex_id(value: &str) {
        assert_eq!(value.len(), 64, "Hex id must be 64 characters: {value}");
        assert!(
            value
                .chars()
                .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()),
            "Hex id must be lowercase hex: {value}"
        );
    }

    #[test]
    fn test_generate_produces_well_formed_values() {
        let generator = CoreIdGenerator::new();
        let ids = generator.generate();

        assert_hex_id(&ids.machine_id);
        assert_hex_id(&ids.mac_machine_id);

        let parsed = Uuid::parse_str(&ids.dev_device_id)
            .expect("Device id should parse as a UUID");
        assert_eq!(parsed.get_version_num(), 4);
        // Canonical string form, not braced/simple/urn.
        assert_eq!(ids.dev_device_id, parsed.hyphenated().to_string());
    }

    #[test]
    fn test_generate_twice_never_repeats() {
        let generator = CoreIdGenerator::new();
        let first = generator.generate();
        let second = generator.generate();

        assert_ne!(first.machine_id, second.machine_id);
        assert_ne!(first.mac_machine_id, second.mac_machine_id);
        assert_ne!(first.dev_device_id, second.dev_device_id);
    }

    #[test]
    fn test_hex_fields_are_independent_of_each_other() {
        let ids = CoreIdGenerator::new().generate();
        assert_ne!(ids.machine_id, ids.mac_machine_id);
    }

    #[test]
    fn test_entries_order_and_keys() {
        let ids = CoreIdGenerator::new().generate();
        let entries = ids.entries();
        assert_eq!(entries[0].0, "telemetry.machineId");
        assert_eq!(entries[1].0, "telemetry.macMachineId");
        assert_eq!(entries[2].0, "telemetry.devDeviceId");
        assert_eq!(entries[0].1, ids.machine_id);
    }
}
