use serde_json::json;
use skiplogic_runner::{NavigationStep, SurveyExpressionRunner, SurveySchema};

fn main() {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).with_target(false).init();

    let survey: SurveySchema = serde_json::from_value(json!({
        "pages": [
            {"name": "rate", "elements": [
                {"type": "nps", "name": "q1"},
                {"type": "text", "name": "q2", "visibleIf": "{q1} >= 9"}
            ]},
            {"name": "detractor", "elements": [{"type": "comment", "name": "q3"}]},
            {"name": "thanks", "elements": []}
        ],
        "calculatedValues": [{"name": "segment", "expression": "iif({q1} >= 9, 'promoter', iif({q1} <= 6, 'detractor', 'passive'))", "includeInResult": true}],
        "triggers": [
            {"type": "skip", "expression": "{segment} = 'promoter'", "gotoName": "thanks"},
            {"type": "setvalue", "expression": "{q1} notempty", "setToName": "rated", "setValue": true}
        ]
    }))
    .unwrap();

    let mut runner = SurveyExpressionRunner::new(survey);
    for score in [10, 4] {
        runner.set_value("q1", score);
        let page = runner.survey().pages[0].clone();
        let visible: Vec<_> = runner.get_visible_elements(&page).iter().map(|e| e.name.clone()).collect();
        let step = runner.next_step();
        println!("q1={score} visible={visible:?} step={step:?}");
        if step == NavigationStep::Continue {
            println!("results={:?}", runner.result_values());
        }
    }
}
