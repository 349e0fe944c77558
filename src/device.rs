use std::fmt;

use crate::alsa::{self, Control, Stream};
use crate::consts;
use crate::error::Result;

/// A PCM endpoint addressed as `hw:<card>,<device>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceId {
    pub card: u32,
    pub device: u32,
}

impl DeviceId {
    pub fn new(card: u32, device: u32) -> Self {
        Self { card, device }
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hw:{},{}", self.card, self.device)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// Cards whose name does not contain this are ignored. Empty accepts all.
    pub card_filter: String,
    /// Playback device index left out of the playback list.
    pub skip_playback_device: Option<u32>,
    pub max_devices: usize,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            card_filter: consts::DEFAULT_CARD_FILTER.to_string(),
            skip_playback_device: Some(consts::DEEP_BUFFER_DEVICE),
            max_devices: consts::MAX_PCMS,
        }
    }
}

impl DiscoveryOptions {
    pub fn accepts_card(&self, name: &str) -> bool {
        self.card_filter.is_empty() || name.contains(self.card_filter.as_str())
    }
}

/// Playback and capture endpoints found on the system.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceList {
    pub playback: Vec<DeviceId>,
    pub capture: Vec<DeviceId>,
}

impl DeviceList {
    /// Records one PCM device of an accepted card, honouring the skip rule and the caps.
    pub fn add(
        &mut self,
        options: &DiscoveryOptions,
        id: DeviceId,
        playback: bool,
        capture: bool,
    ) {
        if playback
            && self.playback.len() < options.max_devices
            && options.skip_playback_device != Some(id.device)
        {
            self.playback.push(id);
        }
        if capture && self.capture.len() < options.max_devices {
            self.capture.push(id);
        }
    }

    /// True when either direction came up empty, so nothing can be paired.
    pub fn has_no_pairs(&self) -> bool {
        self.playback.is_empty() || self.capture.is_empty()
    }

    /// Every playback/capture combination, playback major.
    pub fn pairs(&self) -> impl Iterator<Item = (DeviceId, DeviceId)> + '_ {
        self.playback
            .iter()
            .flat_map(move |&p| self.capture.iter().map(move |&c| (p, c)))
    }

    pub fn print(&self) {
        println!("Available Playback Devices:");
        for id in &self.playback {
            println!("  {id}");
        }
        println!("Available Capture Devices:");
        for id in &self.capture {
            println!("  {id}");
        }
    }
}

/// The PCM devices one card exposes.
pub trait CardPcms {
    fn pcm_devices(&self) -> Result<Vec<u32>>;
    fn has_stream(&self, device: u32, stream: Stream) -> Result<bool>;
}

impl CardPcms for Control {
    fn pcm_devices(&self) -> Result<Vec<u32>> {
        Control::pcm_devices(self)
    }

    fn has_stream(&self, device: u32, stream: Stream) -> Result<bool> {
        Control::has_stream(self, device, stream)
    }
}

/// Adds the PCM devices of `card` to `list`. A card whose devices cannot be
/// listed is skipped, as is a device whose stream info cannot be read.
pub fn collect_card<C: CardPcms>(
    list: &mut DeviceList,
    options: &DiscoveryOptions,
    card: u32,
    control: &C,
) {
    let devices = match control.pcm_devices() {
        Ok(devices) => devices,
        Err(err) => {
            log::warn!("Cannot list PCM devices for card {card}: {err}");
            return;
        }
    };
    for device in devices {
        let id = DeviceId::new(card, device);
        let streams = control.has_stream(device, Stream::Playback).and_then(|playback| {
            control
                .has_stream(device, Stream::Capture)
                .map(|capture| (playback, capture))
        });
        let (playback, capture) = match streams {
            Ok(streams) => streams,
            Err(err) => {
                log::warn!("Cannot get stream info for {id}: {err}");
                continue;
            }
        };
        log::debug!("{id}: playback={playback} capture={capture}");
        list.add(options, id, playback, capture);
    }
}

/// Walks the sound cards and collects their PCM devices.
pub fn discover(options: &DiscoveryOptions) -> Result<DeviceList> {
    let mut list = DeviceList::default();

    for card in alsa::cards() {
        let card = card?;
        let ctl_name = format!("hw:{card}");

        let control = match Control::open(&ctl_name) {
            Ok(control) => control,
            Err(err) => {
                log::warn!("Cannot open control for card {card}: {err}");
                continue;
            }
        };
        let name = match control.card_name() {
            Ok(name) => name,
            Err(err) => {
                log::warn!("Cannot get card info for card {card}: {err}");
                continue;
            }
        };
        if !options.accepts_card(&name) {
            log::debug!("skipping card {card} ({name})");
            continue;
        }
        println!("Card {card}: {name}");

        collect_card(&mut list, options, card, &control);
    }

    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::tests::code;

    #[test]
    fn formats_hw_names() {
        assert_eq!(DeviceId::new(0, 31).to_string(), "hw:0,31");
        assert_eq!(DeviceId::new(2, 7).to_string(), "hw:2,7");
    }

    #[test]
    fn card_filter() {
        let options = DiscoveryOptions::default();
        assert!(options.accepts_card("sof-hda-dsp"));
        assert!(!options.accepts_card("HDA Intel PCH"));

        let all = DiscoveryOptions {
            card_filter: String::new(),
            ..Default::default()
        };
        assert!(all.accepts_card("HDA Intel PCH"));
    }

    #[test]
    fn deep_buffer_is_only_skipped_for_playback() {
        let options = DiscoveryOptions::default();
        let mut list = DeviceList::default();
        list.add(&options, DeviceId::new(0, 0), true, true);
        list.add(&options, DeviceId::new(0, 31), true, true);

        assert_eq!(list.playback, vec![DeviceId::new(0, 0)]);
        assert_eq!(list.capture, vec![DeviceId::new(0, 0), DeviceId::new(0, 31)]);
    }

    #[test]
    fn lists_are_capped() {
        let options = DiscoveryOptions {
            max_devices: 2,
            ..Default::default()
        };
        let mut list = DeviceList::default();
        for device in 0..5 {
            list.add(&options, DeviceId::new(0, device), true, device % 2 == 0);
        }
        assert_eq!(list.playback.len(), 2);
        assert_eq!(list.capture, vec![DeviceId::new(0, 0), DeviceId::new(0, 2)]);
    }

    #[test]
    fn pairs_are_playback_major() {
        let list = DeviceList {
            playback: vec![DeviceId::new(0, 0), DeviceId::new(0, 1)],
            capture: vec![DeviceId::new(0, 6), DeviceId::new(0, 7)],
        };
        let pairs: Vec<_> = list.pairs().map(|(p, c)| (p.device, c.device)).collect();
        assert_eq!(pairs, vec![(0, 6), (0, 7), (1, 6), (1, 7)]);
    }

    #[test]
    fn no_pairs_when_a_direction_is_missing() {
        let list = DeviceList {
            playback: vec![DeviceId::new(0, 0)],
            capture: vec![],
        };
        assert!(list.has_no_pairs());
        assert_eq!(list.pairs().count(), 0);

        let list = DeviceList {
            capture: vec![DeviceId::new(0, 6)],
            ..list
        };
        assert!(!list.has_no_pairs());
        assert_eq!(list.pairs().count(), 1);
    }

    /// Even devices play, every device captures. `None` devices fail the
    /// listing, `broken` ones their stream lookup.
    struct FakeCard {
        devices: Option<Vec<u32>>,
        broken: Vec<u32>,
    }

    impl CardPcms for FakeCard {
        fn pcm_devices(&self) -> Result<Vec<u32>> {
            self.devices
                .clone()
                .ok_or_else(|| code("snd_ctl_pcm_next_device", -libc::EIO))
        }

        fn has_stream(&self, device: u32, stream: Stream) -> Result<bool> {
            if self.broken.contains(&device) {
                return Err(code("snd_ctl_pcm_info", -libc::EIO));
            }
            Ok(stream == Stream::Capture || device % 2 == 0)
        }
    }

    #[test]
    fn collects_card_devices() {
        let card = FakeCard {
            devices: Some(vec![0, 1, 2]),
            broken: vec![],
        };
        let mut list = DeviceList::default();
        collect_card(&mut list, &DiscoveryOptions::default(), 1, &card);

        assert_eq!(list.playback, vec![DeviceId::new(1, 0), DeviceId::new(1, 2)]);
        assert_eq!(list.capture.len(), 3);
    }

    #[test]
    fn unlistable_card_is_skipped() {
        let options = DiscoveryOptions::default();
        let mut list = DeviceList::default();
        list.add(&options, DeviceId::new(0, 0), true, true);

        let card = FakeCard {
            devices: None,
            broken: vec![],
        };
        collect_card(&mut list, &options, 1, &card);
        assert_eq!(list.playback, vec![DeviceId::new(0, 0)]);
        assert_eq!(list.capture, vec![DeviceId::new(0, 0)]);

        // the next card is still walked
        let card = FakeCard {
            devices: Some(vec![2]),
            broken: vec![],
        };
        collect_card(&mut list, &options, 2, &card);
        assert_eq!(list.playback.len(), 2);
    }

    #[test]
    fn device_without_stream_info_is_skipped() {
        let card = FakeCard {
            devices: Some(vec![0, 1, 2]),
            broken: vec![1],
        };
        let mut list = DeviceList::default();
        collect_card(&mut list, &DiscoveryOptions::default(), 0, &card);
        assert_eq!(list.capture, vec![DeviceId::new(0, 0), DeviceId::new(0, 2)]);
    }
}
