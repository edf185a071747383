//! Vultr interface list to network config v1
//!
//! Every interface the provider reports must exist on the host; the match is
//! done by MAC address. Each one is brought up with DHCP, and a single
//! nameserver entry follows the physical entries.

use tracing::debug;

use super::metadata::InterfaceDescriptor;
use crate::network::v1::{
    ConfigItem, NameserverConfigV1, NetworkConfigV1, PhysicalConfig, SubnetConfig,
};
use crate::network::{HostInterfaceMap, canonical_mac};
use crate::{CloudInitError, InstanceMetadata};

/// Build the network config for the instance
pub fn build_network_config(
    metadata: &InstanceMetadata,
    host_interfaces: &HostInterfaceMap,
    dns_servers: &[String],
) -> Result<NetworkConfigV1, CloudInitError> {
    let interfaces = match metadata.interfaces.as_deref() {
        Some(interfaces) if !interfaces.is_empty() => interfaces,
        _ => return Err(CloudInitError::NoInterfaceData),
    };

    let mut config = interfaces
        .iter()
        .map(|iface| physical_entry(iface, host_interfaces))
        .collect::<Result<Vec<_>, _>>()?;

    debug!("added dns servers: {:?}", dns_servers);
    config.push(ConfigItem::Nameserver(NameserverConfigV1 {
        address: dns_servers.to_vec(),
    }));

    Ok(NetworkConfigV1 {
        version: NetworkConfigV1::VERSION,
        config,
    })
}

fn physical_entry(
    iface: &InterfaceDescriptor,
    host_interfaces: &HostInterfaceMap,
) -> Result<ConfigItem, CloudInitError> {
    let mac = canonical_mac(&iface.mac);
    let name = host_interfaces
        .get(&mac)
        .ok_or_else(|| CloudInitError::interface_not_found(&mac))?;

    let phys = PhysicalConfig {
        mac_address: mac.clone(),
        name: name.clone(),
        subnets: vec![SubnetConfig::dhcp_auto()],
    };
    debug!("nic '{}' configuration: {:?}", name, phys);

    Ok(ConfigItem::Physical(phys))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata_with(macs: &[&str]) -> InstanceMetadata {
        InstanceMetadata {
            instance_id: "i-1".to_string(),
            local_hostname: "h".to_string(),
            interfaces: Some(
                macs.iter()
                    .map(|mac| InterfaceDescriptor {
                        mac: mac.to_string(),
                        ipv4: None,
                        ipv6: None,
                        network_type: None,
                    })
                    .collect(),
            ),
            ..Default::default()
        }
    }

    fn host(pairs: &[(&str, &str)]) -> HostInterfaceMap {
        pairs
            .iter()
            .map(|(mac, name)| (mac.to_string(), name.to_string()))
            .collect()
    }

    fn dns() -> Vec<String> {
        vec!["10.61.10.10".to_string()]
    }

    #[test]
    fn test_single_interface_example() {
        let metadata = metadata_with(&["00:00:00:00:00:00"]);
        let config =
            build_network_config(&metadata, &host(&[("00:00:00:00:00:00", "eth0")]), &dns())
                .unwrap();

        assert_eq!(
            serde_json::to_value(&config).unwrap(),
            json!({
                "version": 1,
                "config": [
                    {
                        "type": "physical",
                        "mac_address": "00:00:00:00:00:00",
                        "name": "eth0",
                        "subnets": [{"type": "dhcp", "control": "auto"}]
                    },
                    {"type": "nameserver", "address": ["10.61.10.10"]}
                ]
            })
        );
    }

    #[test]
    fn test_order_follows_provider() {
        let metadata = metadata_with(&["5a:00:00:00:00:02", "56:00:00:00:00:01"]);
        let host = host(&[("56:00:00:00:00:01", "enp1s0"), ("5a:00:00:00:00:02", "enp6s0")]);

        let config = build_network_config(&metadata, &host, &dns()).unwrap();

        assert_eq!(config.config.len(), 3);
        let names: Vec<_> = config.physical().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["enp6s0", "enp1s0"]);
        assert!(matches!(config.config.last(), Some(ConfigItem::Nameserver(_))));
    }

    #[test]
    fn test_nameserver_carries_all_servers() {
        let metadata = metadata_with(&["56:00:00:00:00:01"]);
        let servers = vec!["1.1.1.1".to_string(), "8.8.8.8".to_string()];

        let config =
            build_network_config(&metadata, &host(&[("56:00:00:00:00:01", "eth0")]), &servers)
                .unwrap();

        match config.config.last() {
            Some(ConfigItem::Nameserver(ns)) => assert_eq!(ns.address, servers),
            other => panic!("Expected nameserver entry, got {:?}", other),
        }
    }

    #[test]
    fn test_mac_matched_case_insensitively() {
        let metadata = metadata_with(&["56:00:03:AB:CD:EF"]);
        let config =
            build_network_config(&metadata, &host(&[("56:00:03:ab:cd:ef", "eth0")]), &dns())
                .unwrap();

        let phys: Vec<_> = config.physical().collect();
        assert_eq!(phys[0].mac_address, "56:00:03:ab:cd:ef");
        assert_eq!(phys[0].name, "eth0");
    }

    #[test]
    fn test_missing_mac_fails() {
        let metadata = metadata_with(&["56:00:00:00:00:01", "5a:00:00:00:00:02"]);
        let err =
            build_network_config(&metadata, &host(&[("56:00:00:00:00:01", "eth0")]), &dns())
                .unwrap_err();

        match err {
            CloudInitError::InterfaceNotFound { mac } => assert_eq!(mac, "5a:00:00:00:00:02"),
            other => panic!("Expected InterfaceNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_no_interfaces() {
        let metadata = InstanceMetadata::default();
        let err = build_network_config(&metadata, &HostInterfaceMap::new(), &dns()).unwrap_err();
        assert!(matches!(err, CloudInitError::NoInterfaceData));

        let metadata = metadata_with(&[]);
        let err = build_network_config(&metadata, &HostInterfaceMap::new(), &dns()).unwrap_err();
        assert!(matches!(err, CloudInitError::NoInterfaceData));
    }

    #[test]
    fn test_duplicate_provider_macs_kept() {
        let metadata = metadata_with(&["56:00:00:00:00:01", "56:00:00:00:00:01"]);
        let config =
            build_network_config(&metadata, &host(&[("56:00:00:00:00:01", "eth0")]), &dns())
                .unwrap();
        assert_eq!(config.physical().count(), 2);
    }
}
