use alloc::vec::Vec;

use crate::layer::{Error, Result};
use crate::managed::{Key, Slots};
use crate::nic::Device;
use crate::wire::EthernetAddress;

/// A link multicast address with the number of its users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Group {
    addr: EthernetAddress,
    refcount: usize,
}

/// The multicast memberships of the link.
///
/// The device filter is programmed when an address is added or removed, never for a change of
/// the count alone. Several ip groups can map to the same link address and share one entry.
#[derive(Debug)]
pub(crate) struct Groups {
    groups: Slots<Group>,
}

impl Groups {
    pub(crate) fn new(capacity: usize) -> Self {
        Groups { groups: Slots::new(capacity) }
    }

    pub(crate) fn contains(&self, addr: EthernetAddress) -> bool {
        self.groups.find(|group| group.addr == addr).is_some()
    }

    pub(crate) fn join<D: Device>(&mut self, device: &mut D, addr: EthernetAddress) -> Result<()> {
        let existing = self.groups.iter_mut().find(|(_, group)| group.addr == addr);
        if let Some((_, group)) = existing {
            group.refcount += 1;
            return Ok(());
        }

        let key = self.groups.insert(Group { addr, refcount: 1 })
            .map_err(|_| {
                net_warn!("eth: no room for multicast address {}", addr);
                Error::Exhausted
            })?;

        if !self.program(device) {
            self.groups.remove(key);
            net_warn!("eth: device refused multicast filter with {}", addr);
            return Err(Error::Illegal);
        }

        net_debug!("eth: receiving {}", addr);
        Ok(())
    }

    pub(crate) fn leave<D: Device>(&mut self, device: &mut D, addr: EthernetAddress) -> Result<()> {
        let key = self.groups.find(|group| group.addr == addr)
            .ok_or(Error::NotFound)?;

        let last_user = match self.groups.get_mut(key) {
            Some(group) if group.refcount > 1 => {
                group.refcount -= 1;
                false
            },
            Some(_) => true,
            None => return Err(Error::NotFound),
        };

        if last_user {
            self.remove(device, key)
        } else {
            Ok(())
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.groups.len()
    }

    fn remove<D: Device>(&mut self, device: &mut D, key: Key) -> Result<()> {
        let group = match self.groups.remove(key) {
            Some(group) => group,
            None => return Err(Error::NotFound),
        };

        if !self.program(device) {
            // The slot was just freed, so this can not fail.
            let _ = self.groups.insert(group);
            net_warn!("eth: device refused multicast filter without {}", group.addr);
            return Err(Error::Illegal);
        }

        net_debug!("eth: no longer receiving {}", group.addr);
        Ok(())
    }

    fn program<D: Device>(&self, device: &mut D) -> bool {
        let addrs: Vec<EthernetAddress> = self.groups.iter()
            .map(|(_, group)| group.addr)
            .collect();
        device.set_multicast_filter(&addrs)
    }
}
