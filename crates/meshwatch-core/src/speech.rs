// ── Spoken responses ──
//
// Template filling for voice answers. Every builder takes plain domain
// data and returns a finished sentence or two; nothing here does I/O.

use chrono::{DateTime, Utc};

use crate::model::{AccessPoint, DeviceCategory, DeviceTypeCounts, Event, NetworkSnapshot};

/// Recent-events answers mention at most this many events.
pub const MAX_SPOKEN_EVENTS: usize = 5;

pub const REPROMPT: &str = "What would you like to know about your network?";

fn plural(n: impl Into<u64>) -> &'static str {
    if n.into() == 1 { "" } else { "s" }
}

fn is_are(n: impl Into<u64>) -> &'static str {
    if n.into() == 1 { " is" } else { "s are" }
}

/// "a", "a and b", "a, b, and c".
pub fn join_list(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [one] => one.clone(),
        [a, b] => format!("{a} and {b}"),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
    }
}

fn totals(snapshots: &[NetworkSnapshot]) -> (u32, u32, u32) {
    snapshots.iter().fold((0, 0, 0), |(t, w, d), s| {
        (t + s.total_devices, w + s.wireless_devices, d + s.wired_devices)
    })
}

// ── Builders ─────────────────────────────────────────────────────────

pub fn welcome(device_count: u32, total_networks: usize, online_networks: usize) -> String {
    let mut out = String::from("Welcome to your mesh network monitor! ");
    if device_count > 0 {
        out.push_str(&format!(
            "You currently have {device_count} device{} connected to your network{}. ",
            plural(device_count),
            if total_networks > 1 { "s" } else { "" }
        ));
    }
    if total_networks > 1 {
        let lead = if online_networks == total_networks { "All " } else { "" };
        out.push_str(&format!(
            "{lead}{online_networks} of your {total_networks} networks are online. "
        ));
    }
    out.push_str(REPROMPT);
    out
}

pub fn device_count(snapshots: &[NetworkSnapshot]) -> String {
    if snapshots.is_empty() {
        return "I couldn't find any network information. Please make sure your networks are configured and try again.".into();
    }

    let (total, wireless, wired) = totals(snapshots);
    let mut out = format!("You have {total} device{} connected", plural(total));
    if snapshots.len() > 1 {
        out.push_str(&format!(" across your {} networks", snapshots.len()));
    }
    out.push_str(". ");

    if wireless > 0 && wired > 0 {
        out.push_str(&format!("{wireless} are wireless and {wired} are wired. "));
    } else if wireless > 0 {
        out.push_str("All are connected wirelessly. ");
    } else if wired > 0 {
        out.push_str("All are wired connections. ");
    }

    if snapshots.len() > 1 {
        // First network wins ties.
        let busiest = snapshots.iter().fold(&snapshots[0], |max, s| {
            if s.total_devices > max.total_devices { s } else { max }
        });
        if busiest.total_devices > 0 {
            out.push_str(&format!(
                "Your busiest network is {} with {} devices.",
                busiest.name, busiest.total_devices
            ));
        }
    }

    out.trim_end().to_owned()
}

pub fn network_status(snapshots: &[NetworkSnapshot]) -> String {
    if snapshots.is_empty() {
        return "I couldn't get your network status right now. Please try again.".into();
    }

    let mut out = String::from(if snapshots.len() > 1 {
        "Your networks are running smoothly. "
    } else {
        "Your network is running smoothly. "
    });

    let (total, _, _) = totals(snapshots);
    let aps: usize = snapshots.iter().map(|s| s.access_points.len()).sum();
    let aps = u64::try_from(aps).unwrap_or(u64::MAX);

    if total > 0 {
        out.push_str(&format!("{total} device{} currently connected. ", is_are(total)));
    }
    if aps > 0 {
        out.push_str(&format!("All {aps} access point{} online", is_are(aps)));
        if snapshots.len() > 1 {
            out.push_str(" across your networks");
        }
        out.push_str(". ");
    }

    out.push_str("Network performance is good with strong signal coverage.");
    out
}

pub fn device_types(snapshots: &[NetworkSnapshot]) -> String {
    if snapshots.is_empty() {
        return "I couldn't get device type information right now.".into();
    }

    let mut counts = DeviceTypeCounts::default();
    for snapshot in snapshots {
        counts.merge(&snapshot.device_types);
    }

    let parts: Vec<String> = counts
        .iter()
        .filter(|(_, n)| *n > 0)
        .map(|(category, n)| format!("{n} {}{}", category.noun(), plural(n)))
        .collect();

    if parts.is_empty() {
        return "No devices are currently connected to your network.".into();
    }
    format!("You have {} connected.", join_list(&parts))
}

/// Spoken name: nickname, else "the {location} access point", else
/// "the {model}", else "an access point".
pub fn ap_display_name(ap: &AccessPoint) -> String {
    if let Some(nickname) = ap.nickname.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        return nickname.to_owned();
    }
    if let Some(location) = ap.location.as_deref().filter(|s| !s.is_empty()) {
        return format!("the {location} access point");
    }
    if let Some(model) = ap.model.as_deref().filter(|s| !s.is_empty()) {
        return format!("the {model}");
    }
    "an access point".into()
}

pub fn ap_performance(access_points: &[AccessPoint]) -> String {
    if access_points.is_empty() {
        return "I couldn't get access point information right now.".into();
    }

    let mut sorted: Vec<&AccessPoint> = access_points.iter().collect();
    sorted.sort_by(|a, b| b.device_count.cmp(&a.device_count));
    let n = u64::try_from(access_points.len()).unwrap_or(u64::MAX);

    let mut out = format!("You have {n} access point{} online. ", plural(n));

    if let Some(busiest) = sorted.first().filter(|ap| ap.device_count > 0) {
        out.push_str(&format!(
            "Your busiest access point is {} with {} device{}. ",
            ap_display_name(busiest),
            busiest.device_count,
            plural(busiest.device_count)
        ));
    }

    let active = access_points.iter().filter(|ap| ap.device_count > 0).count();
    let active = u64::try_from(active).unwrap_or(u64::MAX);
    if active > 0 {
        out.push_str(&format!(
            "{active} access point{} actively serving devices with good signal strength.",
            is_are(active)
        ));
    } else {
        out.push_str("All access points are online and ready for connections.");
    }
    out
}

// ── Events ───────────────────────────────────────────────────────────

/// "just now", "5 minutes ago", "2 hours ago", "3 days ago", "over a week ago".
pub fn time_ago(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let mins = (now - timestamp).num_minutes();
    let hours = mins / 60;
    let days = hours / 24;

    if mins < 1 {
        "just now".into()
    } else if mins < 60 {
        format!("{mins} minute{} ago", if mins == 1 { "" } else { "s" })
    } else if hours < 24 {
        format!("{hours} hour{} ago", if hours == 1 { "" } else { "s" })
    } else if days < 7 {
        format!("{days} day{} ago", if days == 1 { "" } else { "s" })
    } else {
        "over a week ago".into()
    }
}

/// One event as a spoken clause, ending in how long ago it happened.
pub fn describe_event(event: &Event, now: DateTime<Utc>) -> String {
    let ago = time_ago(event.timestamp(), now);
    match event {
        Event::DeviceConnected(e) if e.is_new_device => {
            format!("A new device called {} joined {ago}", e.device_name)
        }
        Event::DeviceConnected(e) => format!("{} connected {ago}", e.device_name),
        Event::DeviceDisconnected(e) => format!("{} disconnected {ago}", e.device_name),
        Event::SignificantDeviceChange(e) => format!(
            "{} went from {} to {} devices {ago}",
            e.network_name, e.previous_count, e.current_count
        ),
        Event::ApLoadImbalance(e) => format!(
            "{} was carrying most of the load on {} {ago}",
            e.report.busiest_ap, e.network_name
        ),
        Event::ApDeviceChange(e) => format!(
            "{} went from {} to {} devices {ago}",
            e.ap_name, e.previous_devices, e.current_devices
        ),
    }
}

/// Newest-first events to a spoken summary of at most five.
pub fn recent_events(events: &[Event], now: DateTime<Utc>) -> String {
    if events.is_empty() {
        return "No recent network events to report. Your network has been stable.".into();
    }
    let clauses: Vec<String> = events
        .iter()
        .take(MAX_SPOKEN_EVENTS)
        .map(|e| describe_event(e, now))
        .collect();
    format!("Here are your recent network events: {}.", join_list(&clauses))
}

pub fn help() -> String {
    "I can help you monitor your mesh network. You can ask me things like: \
     How many devices are connected? What's my network status? \
     Tell me about device types. How are my access points performing? \
     What happened recently? What would you like to know?"
        .into()
}

pub fn goodbye() -> String {
    "Goodbye! Your network is in good hands.".into()
}

pub fn fallback() -> String {
    "I'm not sure how to help with that. I can tell you about your network devices, \
     status, access points, and recent events. What would you like to know?"
        .into()
}

/// Label for a category in tables, e.g. "Smart home".
pub fn category_label(category: DeviceCategory) -> &'static str {
    match category {
        DeviceCategory::Phones => "Phones",
        DeviceCategory::Laptops => "Laptops",
        DeviceCategory::Tablets => "Tablets",
        DeviceCategory::SmartHome => "Smart home",
        DeviceCategory::Gaming => "Gaming",
        DeviceCategory::Streaming => "Streaming",
        DeviceCategory::Other => "Other",
    }
}
