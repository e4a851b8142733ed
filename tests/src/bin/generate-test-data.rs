use chrono::{Duration, Utc};
use mlem_api::{
    Comment, CommentAggregates, CommentId, CommentPath, CommentView, GetCommentsResponse, Person,
    PersonId, PostId, ScoringOperation,
};
use rand::{seq::SliceRandom, Rng};

const NUM_USERS: i64 = 8;
const NUM_COMMENTS: i64 = 200;
const POST_ID: PostId = PostId(1);

// Chance for a comment to be a reply rather than top-level, in percent
const REPLY_CHANCE: u32 = 75;
const MAX_SCORE: i64 = 60;
const COMMENT_WORD_COUNT: usize = 25;

fn gen_user(rng: &mut impl Rng) -> Person {
    let id = rng.gen_range(1..=NUM_USERS);
    Person {
        id: PersonId(id),
        name: format!("user{id}"),
        display_name: rng.gen_bool(0.5).then(lipsum::lipsum_title),
    }
}

fn gen_vote(rng: &mut impl Rng) -> Option<ScoringOperation> {
    [
        None,
        None,
        None,
        Some(ScoringOperation::Upvote),
        Some(ScoringOperation::Downvote),
    ]
    .choose(rng)
    .copied()
    .flatten()
}

fn main() {
    let mut rng = rand::thread_rng();
    let start = Utc::now() - Duration::days(2);
    let mut views: Vec<CommentView> = Vec::new();

    for i in 0..NUM_COMMENTS {
        let id = CommentId(i + 1);
        let parent = match rng.gen_ratio(REPLY_CHANCE, 100) {
            true => views.choose(&mut rng).map(|p| p.comment.path.clone()),
            false => None,
        };
        let path = match &parent {
            Some(p) => p.child(id),
            None => CommentPath::top_level(id),
        };

        // Every ancestor gets one more reply in its subtree
        for ancestor in path.segments().unwrap_or_default() {
            if let Some(a) = views.iter_mut().find(|v| v.id() == ancestor) {
                a.counts.child_count += 1;
            }
        }

        let upvotes = rng.gen_range(0..MAX_SCORE);
        let downvotes = rng.gen_range(0..MAX_SCORE / 4);
        let creator = gen_user(&mut rng);
        views.push(CommentView {
            comment: Comment {
                id,
                creator_id: creator.id,
                post_id: POST_ID,
                content: lipsum::lipsum_words(COMMENT_WORD_COUNT),
                path,
                published: start + Duration::minutes(i * 10 + rng.gen_range(0..10)),
                updated: None,
                deleted: rng.gen_ratio(1, 30),
                removed: false,
                distinguished: false,
            },
            creator,
            counts: CommentAggregates {
                score: upvotes - downvotes,
                upvotes,
                downvotes,
                child_count: 0,
            },
            saved: rng.gen_ratio(1, 20),
            my_vote: gen_vote(&mut rng),
        });
    }

    // Servers answer in no particular order
    views.shuffle(&mut rng);
    let res = GetCommentsResponse { comments: views };
    println!(
        "{}",
        serde_json::to_string_pretty(&res).expect("serializing generated comments")
    );
}
