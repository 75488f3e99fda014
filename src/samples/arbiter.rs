// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Assignment of the fixed hardware channel pool to pads.

use tracing::{debug, warn};

use crate::audio::{ChannelId, Driver};

/// The channel used when every channel is busy.
const FALLBACK_CHANNEL: ChannelId = ChannelId(0);

/// Who holds a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    /// The sample assigned to the pad at this index.
    Pad(usize),
    /// The file browser's transient preview sample.
    Preview,
}

/// The result of acquiring a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acquired {
    pub channel: ChannelId,
    /// A previous holder that lost the channel and must forget it.
    pub evicted: Option<Owner>,
}

/// Tracks which owner holds each hardware channel. Ownership is a back-reference
/// only; the samples themselves live with their pads.
pub struct ChannelPool {
    owners: Vec<Option<Owner>>,
}

impl ChannelPool {
    pub fn new(size: usize) -> ChannelPool {
        ChannelPool {
            owners: vec![None; size],
        }
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    pub fn owner(&self, channel: ChannelId) -> Option<Owner> {
        self.owners.get(channel.index()).copied().flatten()
    }

    /// Returns a channel for `owner`, whose last known channel is `current`.
    ///
    /// An owner that still holds its channel gets it back after any voice on it is
    /// choked. Otherwise the first idle unowned channel is taken, then the first
    /// idle channel at all. With every channel busy the fallback channel is shared,
    /// accepting an audible collision rather than dropping the trigger.
    pub fn acquire(
        &mut self,
        driver: &dyn Driver,
        owner: Owner,
        current: Option<ChannelId>,
    ) -> Acquired {
        if let Some(channel) = current {
            if self.owner(channel) == Some(owner) {
                if driver.is_playing(channel) {
                    debug!(?owner, channel = channel.index(), "Choking previous voice");
                }
                driver.stop(channel);
                return Acquired {
                    channel,
                    evicted: None,
                };
            }
        }

        let idle = |i: &usize| !driver.is_playing(ChannelId(*i));
        let channel = (0..self.owners.len())
            .filter(idle)
            .find(|i| self.owners[*i].is_none())
            .or_else(|| (0..self.owners.len()).find(idle))
            .map(ChannelId);

        let channel = match channel {
            Some(channel) => channel,
            None => {
                warn!(
                    ?owner,
                    channel = FALLBACK_CHANNEL.index(),
                    "All channels busy, sharing the fallback channel"
                );
                FALLBACK_CHANNEL
            }
        };

        let evicted = match self.owners.get_mut(channel.index()) {
            Some(slot) => slot.replace(owner).filter(|previous| *previous != owner),
            None => None,
        };
        if let Some(previous) = evicted {
            debug!(
                ?owner,
                ?previous,
                channel = channel.index(),
                "Channel taken from previous owner"
            );
        }
        debug!(?owner, channel = channel.index(), "Channel acquired");

        Acquired { channel, evicted }
    }

    /// Stops the voice on `owner`'s channel and gives the channel up. Does nothing if
    /// the channel has since been taken by someone else.
    pub fn release(&mut self, driver: &dyn Driver, owner: Owner, current: Option<ChannelId>) {
        let Some(channel) = current else {
            return;
        };
        if self.owner(channel) != Some(owner) {
            return;
        }

        driver.stop(channel);
        self.owners[channel.index()] = None;
        debug!(?owner, channel = channel.index(), "Channel released");
    }

    /// Stops every channel and forgets all owners.
    pub fn release_all(&mut self, driver: &dyn Driver) {
        for (index, slot) in self.owners.iter_mut().enumerate() {
            driver.stop(ChannelId(index));
            *slot = None;
        }
    }
}
