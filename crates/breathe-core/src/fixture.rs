use crate::model::*;

/// Demo workspace snapshot used by the in-memory store and the test suite.
pub fn workspace_fixture() -> WorkspaceSnapshot {
    WorkspaceSnapshot {
        commands: vec![
            CommandCard {
                id: "cmd_2025_01_23_001".into(),
                gmail_thread_id: "18d4f2c8a1b9e3f7".into(),
                content: CardContent {
                    sender: EmailSender {
                        name: "Sarah Chen".into(),
                        email: "sarah@acme.com".into(),
                        avatar_url: Some("https://i.pravatar.cc/150?img=1".into()),
                        verification_badge: true,
                    },
                    subject: "Q4 Budget Approval Required".into(),
                    preview: "The revised Q4 budget allocation needs your approval by EOD. The finance team has reviewed all departments and we're ready to proceed.".into(),
                    action_metadata: ActionMetadata {
                        action_type: ActionType::Approve,
                        score: 92.0,
                        deadline_iso: Some("2025-01-23T17:00:00Z".into()),
                    },
                    thread_context: ThreadContext {
                        message_count: 7,
                        participants: 3,
                        last_activity: "12m ago".into(),
                    },
                    tags: vec!["Finance".into(), "Approval".into()],
                },
            },
            CommandCard {
                id: "cmd_2025_01_23_002".into(),
                gmail_thread_id: "18d4f2c8a1b9e3f8".into(),
                content: CardContent {
                    sender: EmailSender {
                        name: "Marcus Johnson".into(),
                        email: "marcus@partner.co".into(),
                        avatar_url: Some("https://i.pravatar.cc/150?img=12".into()),
                        verification_badge: false,
                    },
                    subject: "Partnership Proposal Review".into(),
                    preview: "Following up on our partnership discussion. I've attached the updated proposal with the revised terms.".into(),
                    action_metadata: ActionMetadata {
                        action_type: ActionType::Review,
                        score: 78.0,
                        deadline_iso: Some("2025-01-24T12:00:00Z".into()),
                    },
                    thread_context: ThreadContext {
                        message_count: 4,
                        participants: 2,
                        last_activity: "2h ago".into(),
                    },
                    tags: vec!["Partnership".into()],
                },
            },
            CommandCard {
                id: "cmd_2025_01_23_003".into(),
                gmail_thread_id: "18d4f2c8a1b9e3f9".into(),
                content: CardContent {
                    sender: EmailSender {
                        name: "Emily Rodriguez".into(),
                        email: "emily@client.com".into(),
                        avatar_url: Some("https://i.pravatar.cc/150?img=5".into()),
                        verification_badge: false,
                    },
                    subject: "Project Timeline Update".into(),
                    preview: "Quick update on the project milestones. We need to discuss the delivery schedule for Q2.".into(),
                    action_metadata: ActionMetadata {
                        action_type: ActionType::Respond,
                        score: 65.0,
                        deadline_iso: Some("2025-01-25T10:00:00Z".into()),
                    },
                    thread_context: ThreadContext {
                        message_count: 2,
                        participants: 2,
                        last_activity: "5h ago".into(),
                    },
                    tags: vec!["Project".into()],
                },
            },
        ],
        insights: vec![
            Insight {
                id: "insight_001".into(),
                title: "Weekly AI Roundup".into(),
                summary: "Summaries from 3 sources covering the latest in AI development. Key developments include xAI's new model release and ongoing ethics debates in the AI community.".into(),
                highlights: vec![
                    "xAI's Grok 2.0 shows 40% improvement in reasoning tasks".into(),
                    "EU finalizes AI Act implementation guidelines".into(),
                    "OpenAI announces partnership with major healthcare provider".into(),
                ],
                source: "MIT Technology Review, The Verge, TechCrunch".into(),
                is_new: true,
            },
            Insight {
                id: "insight_002".into(),
                title: "Productivity Tools Digest".into(),
                summary: "Curated insights on the latest productivity tools and techniques from industry leaders. Focus on async communication and deep work strategies.".into(),
                highlights: vec![
                    "New study shows 4-day work week increases productivity by 23%".into(),
                    "Top 5 tools for remote team collaboration in 2025".into(),
                    "Cal Newport discusses digital minimalism strategies".into(),
                ],
                source: "Harvard Business Review, Hacker News".into(),
                is_new: false,
            },
        ],
        calendar: vec![
            CalendarItem {
                id: "event_001".into(),
                title: "AI Governance Briefing".into(),
                time: "Today 2:00 PM".into(),
                duration: "45 minutes".into(),
                item_type: CalendarItemType::Event,
                location: Some("Board Room".into()),
                attendees: Some(6),
            },
            CalendarItem {
                id: "event_002".into(),
                title: "Finance Deadline".into(),
                time: "Tomorrow 9:00 AM".into(),
                duration: "All day".into(),
                item_type: CalendarItemType::Deadline,
                location: None,
                attendees: None,
            },
        ],
        debrief: DebriefSnapshot {
            statistics: DebriefStatistics {
                today: TimelineStats {
                    actions_resolved: 7,
                    critical_handled: 2,
                    average_response_time: "6m 12s".into(),
                    focus_score: 0.78,
                },
            },
            follow_ups: vec![
                FollowUp {
                    thread_id: "fu_001".into(),
                    subject: "Re: Partnership Proposal".into(),
                    waiting_since_iso: "2025-01-22T15:30:00Z".into(),
                    waiting_since_label: "1 day ago".into(),
                    recipient: "alex@partner.co".into(),
                    urgency: Urgency::Medium,
                },
                FollowUp {
                    thread_id: "fu_002".into(),
                    subject: "Contract Review Status".into(),
                    waiting_since_iso: "2025-01-23T09:00:00Z".into(),
                    waiting_since_label: "8 hours ago".into(),
                    recipient: "legal@company.com".into(),
                    urgency: Urgency::High,
                },
            ],
        },
        snoozed: vec![SnoozedItem {
            id: "snooze_001".into(),
            gmail_thread_id: "18d4f2c8a1b9e3f1".into(),
            sender: SenderRef {
                name: "David Park".into(),
                email: "david@tech.com".into(),
                avatar_url: Some("https://i.pravatar.cc/150?img=15".into()),
            },
            subject: "Follow-up: Product Roadmap Discussion".into(),
            snooze_until_label: "Tomorrow 9:00 AM".into(),
            snooze_until_iso: "2025-01-24T09:00:00Z".into(),
            tags: vec!["Product".into(), "Roadmap".into()],
        }],
        awaiting_replies: vec![AwaitingReply {
            id: "await_001".into(),
            gmail_thread_id: "18d4f2c8a1b9e3f4".into(),
            email: "alex@startup.co".into(),
            subject: "Re: Investment opportunity".into(),
            last_sent_label: "Monday".into(),
            days_waiting: 3,
            tags: vec!["Investment".into()],
        }],
    }
}

/// Freshness metadata for the demo workspace.
pub fn fixture_meta() -> DashboardMeta {
    DashboardMeta {
        commands: SliceMeta { updated_at: "2025-01-23T17:05:00Z".into() },
        insights: SliceMeta { updated_at: "2025-01-23T16:15:00Z".into() },
        timeline: SliceMeta { updated_at: "2025-01-23T15:45:00Z".into() },
        calendar: SliceMeta { updated_at: "2025-01-23T12:00:00Z".into() },
        snoozed: SliceMeta { updated_at: "2025-01-23T09:30:00Z".into() },
    }
}
