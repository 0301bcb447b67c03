//! Prompt text sent to the completion provider.
//!
//! Request fields are embedded as pretty-printed JSON so the model sees exactly what
//! the front-end sent.

use serde_json::Value;

use crate::models::{
    ActivitySuggestion, ActivitySuggestions, AnalysisRequest, AutofillRequest, Coordinates,
};

const ANALYSIS_CHECKLIST: &[&str] = &[
    "- Tourist destination feedback and suggestions",
    "- Time management feedback",
    "- Budget feedback",
    "- Cost efficiency feedback",
    "- Feasibility",
    "- Best ways to navigate to each location/activity. Be specific.",
    "- Best airline and cheapest flights according to which month/date/time. Best hotels in the area. Make it specific to the situation.",
    "- Overall planning score (1-100)",
    "- And anything else important",
    "- REMEMBER all costs are in USD",
];

const AUTOFILL_RULES: &[&str] = &[
    "Return EXACTLY VALID JSON. This means no markdown and no conversation.",
    "Start times must be in the time slot it's in. End times must be after start times but don't have to be in the time slot in question.",
    "Be a bit specific on activity locations and names. For example, you can include city name, state/province, or country in location.",
    "Create accurate latitude and longitude coordinates for each location, and put them in the 'coords' object as 'lat' and 'lng'.",
    "DO NOT make new activities that are already existing in the existing activities list.",
    "DO NOT MAKE ANY REPEAT ACTIVITIES AT SAME LANDMARK!!! THERE ARE NO EXCEPTIONS TO THIS RULE.",
    "Only fill the empty slots listed above.",
    "Make sure the schedule flows perfectly and is feasible. Make sure locations and landmarks are real. All costs are in USD.",
];

fn pretty(value: Value) -> String {
    format!("{value:#}")
}

pub fn analysis_prompt(request: &AnalysisRequest) -> String {
    let mut lines = vec![
        "Analyze the travel schedule and give good advice:".to_string(),
        String::new(),
        format!("Date: {}", request.date.as_deref().unwrap_or("Unknown")),
    ];

    if request.start_time.is_some() || request.end_time.is_some() {
        lines.push(format!(
            "Time range: {} - {}",
            request.start_time.as_deref().unwrap_or("Unknown"),
            request.end_time.as_deref().unwrap_or("Unknown"),
        ));
    }
    if let Some(context) = non_empty(request.location_context.as_deref()) {
        lines.push(format!("Location: {context}"));
    }

    lines.extend([
        String::new(),
        "Activities:".to_string(),
        pretty(Value::Array(request.activities.clone())),
        String::new(),
        "Metrics:".to_string(),
        pretty(Value::Object(request.metrics.clone())),
        String::new(),
        "Please give:".to_string(),
    ]);
    lines.extend(ANALYSIS_CHECKLIST.iter().map(|line| line.to_string()));

    lines.join("\n")
}

pub fn autofill_prompt(request: &AutofillRequest) -> String {
    let location_instruction = match non_empty(request.location_context.as_deref()) {
        Some(context) => format!("The trip is in {context}."),
        None => "Location is not specified.".to_string(),
    };

    let mut lines = vec![
        "Task: Fill these empty time slots with travel activities.".to_string(),
        location_instruction,
        format!(
            "Empty Slots: {}",
            pretty(Value::Array(request.empty_slots.clone()))
        ),
        format!(
            "Existing Activities: {}",
            pretty(Value::Array(request.existing_activities.clone()))
        ),
    ];
    lines.extend(AUTOFILL_RULES.iter().map(|line| line.to_string()));
    lines.push("Example format:".to_string());
    lines.push(example_output());

    lines.join("\n")
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn example_output() -> String {
    let example = ActivitySuggestions {
        activities: vec![ActivitySuggestion {
            name: "Lunch at Disneyland".to_string(),
            start: "11:00".to_string(),
            end: "12:00".to_string(),
            expected_cost: 40.0,
            location: "Disneyland, Anaheim, California".to_string(),
            coords: Coordinates {
                lat: 33.8121,
                lng: -117.919,
            },
        }],
    };
    serde_json::to_string_pretty(&example).unwrap_or_default()
}
