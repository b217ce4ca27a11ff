// GraphQL documents issued by `GraphqlBackend`.

pub const VIEWER: &str = r#"query Viewer {
  viewer {
    username
  }
}"#;

pub const GET_FOLLOW_RELATIONSHIP: &str = r#"query GetFollowRelationship($followerId: String!, $followeeId: String!) {
  getFollowRelationship(followerId: $followerId, followeeId: $followeeId) {
    followerId
    followeeId
    timestamp
  }
}"#;

pub const LIST_POSTS_SORTED_BY_TIMESTAMP: &str = r#"query ListPostsSortedByTimestamp(
  $type: String!
  $sortDirection: ModelSortDirection
  $limit: Int
  $nextToken: String
) {
  listPostsSortedByTimestamp(
    type: $type
    sortDirection: $sortDirection
    limit: $limit
    nextToken: $nextToken
  ) {
    items {
      type
      id
      content
      owner
      timestamp
    }
    nextToken
  }
}"#;

pub const CREATE_POST: &str = r#"mutation CreatePost($input: CreatePostInput!) {
  createPost(input: $input) {
    type
    id
    content
    owner
    timestamp
  }
}"#;

pub const CREATE_FOLLOW_RELATIONSHIP: &str = r#"mutation CreateFollowRelationship($input: CreateFollowRelationshipInput!) {
  createFollowRelationship(input: $input) {
    followerId
    followeeId
    timestamp
  }
}"#;

pub const DELETE_FOLLOW_RELATIONSHIP: &str = r#"mutation DeleteFollowRelationship($input: DeleteFollowRelationshipInput!) {
  deleteFollowRelationship(input: $input) {
    followerId
    followeeId
    timestamp
  }
}"#;

pub const ON_CREATE_POST: &str = r#"subscription OnCreatePost {
  onCreatePost {
    type
    id
    content
    owner
    timestamp
  }
}"#;
