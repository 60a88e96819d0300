//! End-to-end dispatcher tests: inbound events in, outbound actions out,
//! ledger on a throwaway directory.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use chocbot_core::QuizParams;
use chocbot_gateway::event::parse_quiz_custom_id;
use chocbot_gateway::{
    Bot, BotConfig, CommandInvocation, ComponentClick, InboundEvent, OutboundAction, Reply,
};

struct Harness {
    bot: Arc<Bot>,
    inbound: mpsc::Sender<InboundEvent>,
    outbound: mpsc::Receiver<OutboundAction>,
    _dir: tempfile::TempDir,
}

fn spawn_bot(quiz: QuizParams) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let config = BotConfig::new()
        .with_data_dir(dir.path().join("data"))
        .with_quiz(quiz);

    let bot = Arc::new(Bot::new(config));
    let (inbound_tx, inbound_rx) = mpsc::channel(16);
    let (outbound_tx, outbound_rx) = mpsc::channel(16);

    let runner = bot.clone();
    tokio::spawn(async move {
        runner.run(inbound_rx, outbound_tx).await;
    });

    Harness {
        bot,
        inbound: inbound_tx,
        outbound: outbound_rx,
        _dir: dir,
    }
}

async fn next_action(harness: &mut Harness) -> OutboundAction {
    tokio::time::timeout(Duration::from_secs(2), harness.outbound.recv())
        .await
        .expect("timed out waiting for an outbound action")
        .expect("outbound channel closed")
}

async fn expect_silence(harness: &mut Harness) {
    let res = tokio::time::timeout(Duration::from_millis(300), harness.outbound.recv()).await;
    assert!(res.is_err(), "expected no outbound action, got {:?}", res);
}

fn respond_reply(action: OutboundAction) -> (String, Reply) {
    match action {
        OutboundAction::Respond {
            interaction_id,
            reply,
        } => (interaction_id, reply),
        other => panic!("expected Respond, got {:?}", other),
    }
}

fn edit_reply(action: OutboundAction) -> (String, Reply) {
    match action {
        OutboundAction::Edit {
            interaction_id,
            reply,
        } => (interaction_id, reply),
        other => panic!("expected Edit, got {:?}", other),
    }
}

/// `Solve: **4 + 9 = ?**` → 13
fn parse_sum(content: &str) -> i64 {
    let start = content.find("**").unwrap() + 2;
    let end = content[start..].find("**").unwrap() + start;
    let problem = &content[start..end];
    let mut parts = problem.split(['+', '=']);
    let lhs: i64 = parts.next().unwrap().trim().parse().unwrap();
    let rhs: i64 = parts.next().unwrap().trim().parse().unwrap();
    lhs + rhs
}

#[tokio::test]
async fn extracredit_is_static() {
    let mut h = spawn_bot(QuizParams::default());
    h.inbound
        .send(InboundEvent::Command(CommandInvocation::new(
            "int-1",
            "teacher",
            "extracredit",
        )))
        .await
        .unwrap();

    let (interaction_id, reply) = respond_reply(next_action(&mut h).await);
    assert_eq!(interaction_id, "int-1");
    assert_eq!(reply.content, "No extra credit in this class!");
    assert!(reply.buttons.is_empty());
}

#[tokio::test]
async fn yesorno_posts_poll_with_reactions() {
    let mut h = spawn_bot(QuizParams::default());
    h.inbound
        .send(InboundEvent::Command(
            CommandInvocation::new("int-1", "u1", "yesorno").with_arg("question", "Pizza friday?"),
        ))
        .await
        .unwrap();

    let (_, reply) = respond_reply(next_action(&mut h).await);
    assert_eq!(reply.content, "**Poll:** Pizza friday?");
    assert_eq!(reply.reactions, vec!["👍".to_string(), "👎".to_string()]);
}

#[tokio::test]
async fn yesorno_without_question_fails_politely() {
    let mut h = spawn_bot(QuizParams::default());
    h.inbound
        .send(InboundEvent::Command(CommandInvocation::new(
            "int-1", "u1", "yesorno",
        )))
        .await
        .unwrap();

    let (_, reply) = respond_reply(next_action(&mut h).await);
    assert!(reply.content.contains("question"));
}

#[tokio::test]
async fn unknown_command_is_answered_not_fatal() {
    let mut h = spawn_bot(QuizParams::default());
    h.inbound
        .send(InboundEvent::Command(CommandInvocation::new(
            "int-1", "u1", "homework",
        )))
        .await
        .unwrap();

    let (_, reply) = respond_reply(next_action(&mut h).await);
    assert!(reply.content.contains("homework"));

    // The loop is still alive.
    h.inbound
        .send(InboundEvent::Command(CommandInvocation::new(
            "int-2",
            "u1",
            "extracredit",
        )))
        .await
        .unwrap();
    let (interaction_id, _) = respond_reply(next_action(&mut h).await);
    assert_eq!(interaction_id, "int-2");
}

#[tokio::test]
async fn equation_correct_answer_credits_once() {
    let mut h = spawn_bot(QuizParams::default());
    h.inbound
        .send(InboundEvent::Command(CommandInvocation::new(
            "int-q", "student", "equation",
        )))
        .await
        .unwrap();

    let (interaction_id, reply) = respond_reply(next_action(&mut h).await);
    assert_eq!(interaction_id, "int-q");
    assert_eq!(reply.buttons.len(), 3);
    assert!(reply.content.contains("Reward:"));

    let answer = parse_sum(&reply.content);
    let correct_button = reply
        .buttons
        .iter()
        .find(|b| parse_quiz_custom_id(&b.custom_id).unwrap().1 == answer)
        .expect("one button must carry the correct sum");

    let click = ComponentClick {
        interaction_id: "int-q".to_string(),
        user_id: "student".to_string(),
        custom_id: correct_button.custom_id.clone(),
    };
    h.inbound
        .send(InboundEvent::Component(click.clone()))
        .await
        .unwrap();

    let (edit_id, edit) = edit_reply(next_action(&mut h).await);
    assert_eq!(edit_id, "int-q");
    assert!(edit.content.contains("You are correct"));
    assert!(edit.buttons.is_empty());

    let ledger = h.bot.state().ledger.load().await.unwrap();
    let credited = *ledger.get("student").unwrap();
    assert!((1..=3).contains(&credited));

    // Double-click: no extra edit, no extra bars.
    h.inbound
        .send(InboundEvent::Component(click))
        .await
        .unwrap();
    expect_silence(&mut h).await;
    let ledger = h.bot.state().ledger.load().await.unwrap();
    assert_eq!(*ledger.get("student").unwrap(), credited);
}

#[tokio::test]
async fn equation_wrong_answer_reveals_correct_and_credits_nothing() {
    let mut h = spawn_bot(QuizParams::default());
    h.inbound
        .send(InboundEvent::Command(CommandInvocation::new(
            "int-q", "student", "equation",
        )))
        .await
        .unwrap();

    let (_, reply) = respond_reply(next_action(&mut h).await);
    let answer = parse_sum(&reply.content);
    let wrong_button = reply
        .buttons
        .iter()
        .find(|b| parse_quiz_custom_id(&b.custom_id).unwrap().1 != answer)
        .unwrap();

    h.inbound
        .send(InboundEvent::Component(ComponentClick {
            interaction_id: "int-q".to_string(),
            user_id: "student".to_string(),
            custom_id: wrong_button.custom_id.clone(),
        }))
        .await
        .unwrap();

    let (_, edit) = edit_reply(next_action(&mut h).await);
    assert!(edit
        .content
        .contains(&format!("The right answer was {}.", answer)));

    let ledger = h.bot.state().ledger.load().await.unwrap();
    assert!(ledger.get("student").is_none());
}

#[tokio::test]
async fn expired_equation_loses_its_buttons_and_pays_nothing() {
    let mut h = spawn_bot(QuizParams::default().with_timeout_secs(0));
    h.inbound
        .send(InboundEvent::Command(CommandInvocation::new(
            "int-q", "student", "equation",
        )))
        .await
        .unwrap();

    let (_, reply) = respond_reply(next_action(&mut h).await);
    let answer = parse_sum(&reply.content);
    let correct_button = reply
        .buttons
        .iter()
        .find(|b| parse_quiz_custom_id(&b.custom_id).unwrap().1 == answer)
        .unwrap()
        .clone();

    // The sweeper ticks once a second; the next Edit strips the buttons.
    let (edit_id, edit) = edit_reply(next_action(&mut h).await);
    assert_eq!(edit_id, "int-q");
    assert!(edit.buttons.is_empty());
    assert!(edit.content.starts_with("Solve:"));

    // A late click on the stale button changes nothing.
    h.inbound
        .send(InboundEvent::Component(ComponentClick {
            interaction_id: "int-q".to_string(),
            user_id: "student".to_string(),
            custom_id: correct_button.custom_id,
        }))
        .await
        .unwrap();
    expect_silence(&mut h).await;

    let ledger = h.bot.state().ledger.load().await.unwrap();
    assert!(ledger.get("student").is_none());
}

#[tokio::test]
async fn late_click_before_sweep_strips_buttons_and_pays_nothing() {
    let mut h = spawn_bot(QuizParams::default().with_timeout_secs(0));
    h.inbound
        .send(InboundEvent::Command(CommandInvocation::new(
            "int-q", "student", "equation",
        )))
        .await
        .unwrap();

    let (_, reply) = respond_reply(next_action(&mut h).await);
    let answer = parse_sum(&reply.content);
    let correct_button = reply
        .buttons
        .iter()
        .find(|b| parse_quiz_custom_id(&b.custom_id).unwrap().1 == answer)
        .unwrap()
        .clone();

    // Click right away, usually beating the sweeper to the expired
    // session. Whichever side wins, exactly one edit strips the buttons
    // and no bars are paid out.
    h.inbound
        .send(InboundEvent::Component(ComponentClick {
            interaction_id: "int-q".to_string(),
            user_id: "student".to_string(),
            custom_id: correct_button.custom_id,
        }))
        .await
        .unwrap();

    let (edit_id, edit) = edit_reply(next_action(&mut h).await);
    assert_eq!(edit_id, "int-q");
    assert!(edit.buttons.is_empty());
    assert!(edit.content.starts_with("Solve:"));
    expect_silence(&mut h).await;

    let ledger = h.bot.state().ledger.load().await.unwrap();
    assert!(ledger.get("student").is_none());
}

#[tokio::test]
async fn barcount_renders_empty_then_sorted() {
    let mut h = spawn_bot(QuizParams::default());

    h.inbound
        .send(InboundEvent::Command(CommandInvocation::new(
            "int-1", "u1", "barcount",
        )))
        .await
        .unwrap();
    let (_, reply) = respond_reply(next_action(&mut h).await);
    assert_eq!(reply.content, "The jar is empty! No chocolate bars found.");

    let ledger = h.bot.state().ledger.clone();
    ledger.add("A", 3).await.unwrap();
    ledger.add("B", 7).await.unwrap();
    ledger.add("C", 1).await.unwrap();

    h.inbound
        .send(InboundEvent::Command(CommandInvocation::new(
            "int-2", "u1", "barcount",
        )))
        .await
        .unwrap();
    let (_, reply) = respond_reply(next_action(&mut h).await);

    let lines: Vec<&str> = reply.content.lines().collect();
    assert!(lines[0].contains("Chocolate Bar Counts"));
    assert_eq!(lines[1], "• <@B>: 7 bars");
    assert_eq!(lines[2], "• <@A>: 3 bars");
    assert_eq!(lines[3], "• <@C>: 1 bars");
}
